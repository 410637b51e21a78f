use thiserror::Error;

/// Errors surfaced by the stream reader and its sinks
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("failed to open serial port {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: serialport::Error,
    },

    #[error("failed to configure serial port: {0}")]
    Configure(#[from] serialport::Error),

    /// The device stopped answering reads (unplugged, permission revoked, ...)
    #[error("serial transport failed: {0}")]
    Transport(#[source] std::io::Error),

    #[error("failed to write to sink: {0}")]
    Sink(#[source] std::io::Error),

    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),

    #[error("stream ended after {written} of {needed} bytes")]
    Truncated { written: usize, needed: usize },
}

impl StreamError {
    /// True for read failures that mean the device is gone
    pub fn is_transport(&self) -> bool {
        matches!(self, StreamError::Transport(_))
    }
}

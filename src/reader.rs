use std::io::Write;
use std::time::Duration;

use log::{debug, trace};

use crate::display::Redraw;
use crate::error::StreamError;
use crate::frame::FrameSpec;
use crate::input::ByteSource;
use crate::output::FrameSink;
use crate::text::LineDecoder;
use crate::window::DisplayWindow;

/// Largest single read request
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub chunk_size: usize,
    /// Pause after a read that returned nothing
    pub idle_backoff: Duration,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            idle_backoff: Duration::from_millis(1),
        }
    }
}

/// Counters from a text ingestion run
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct IngestStats {
    pub samples: usize,
    pub rejected: usize,
}

/// Pulls chunks from a source and routes them through one policy
pub struct StreamReader<S: ByteSource> {
    source: S,
    config: ReaderConfig,
    buf: Vec<u8>,
}

impl<S: ByteSource> StreamReader<S> {
    pub fn new(source: S, config: ReaderConfig) -> Self {
        let buf = vec![0u8; config.chunk_size.max(1)];
        Self {
            source,
            config,
            buf,
        }
    }

    #[cfg(test)]
    pub fn into_source(self) -> S {
        self.source
    }

    fn idle(&self) {
        if !self.config.idle_backoff.is_zero() {
            std::thread::sleep(self.config.idle_backoff);
        }
    }

    /// Forward every byte to `sink` unchanged until the source closes.
    /// Returns the number of bytes forwarded.
    pub fn pass_through<W: Write>(&mut self, sink: &mut W) -> Result<usize, StreamError> {
        let mut forwarded = 0;
        loop {
            let n = match self.source.read_chunk(&mut self.buf)? {
                None => break,
                Some(0) => {
                    self.idle();
                    continue;
                }
                Some(n) => n,
            };
            sink.write_all(&self.buf[..n]).map_err(StreamError::Sink)?;
            sink.flush().map_err(StreamError::Sink)?;
            forwarded += n;
        }
        debug!("source closed after {} bytes", forwarded);
        Ok(forwarded)
    }

    /// Decode ASCII sample lines into `window`, redrawing once per chunk
    /// that produced at least one sample. Malformed lines are skipped.
    pub fn ingest_text<D: Redraw>(
        &mut self,
        window: &mut DisplayWindow,
        display: &mut D,
    ) -> Result<IngestStats, StreamError> {
        let mut decoder = LineDecoder::new();
        let mut stats = IngestStats::default();
        loop {
            let n = match self.source.read_chunk(&mut self.buf)? {
                None => break,
                Some(0) => {
                    self.idle();
                    continue;
                }
                Some(n) => n,
            };

            let samples = decoder.feed(&self.buf[..n]);
            if decoder.rejected() > stats.rejected {
                trace!("dropped {} malformed line(s)", decoder.rejected() - stats.rejected);
                stats.rejected = decoder.rejected();
            }
            if samples.is_empty() {
                continue;
            }

            stats.samples += samples.len();
            for sample in samples {
                window.push(sample);
            }
            display.redraw(window)?;
        }

        // A last line without its newline still counts
        if let Some(sample) = decoder.finish() {
            stats.samples += 1;
            window.push(sample);
            display.redraw(window)?;
        }
        stats.rejected = decoder.rejected();
        debug!(
            "source closed: {} samples, {} rejected",
            stats.samples, stats.rejected
        );
        Ok(stats)
    }

    /// Write exactly `bytes_needed` bytes of whole `frame`s to `sink`.
    ///
    /// Each read asks for no more than what is left of the budget, so no read
    /// is issued once it is met. Bytes of an incomplete frame are held until
    /// the frame completes. Returns `Truncated` if the source closes first;
    /// frames already handed to the sink stay there.
    pub fn record<K: FrameSink>(
        &mut self,
        sink: &mut K,
        frame: FrameSpec,
        bytes_needed: usize,
    ) -> Result<usize, StreamError> {
        let frame_bytes = frame.bytes_per_frame().max(1);
        let budget = bytes_needed - bytes_needed % frame_bytes;
        let mut written = 0;
        let mut frames = Vec::with_capacity(self.buf.len() + frame_bytes);

        while written < budget {
            let want = (budget - written - frames.len()).min(self.buf.len());

            let n = match self.source.read_chunk(&mut self.buf[..want])? {
                None => {
                    return Err(StreamError::Truncated {
                        written,
                        needed: budget,
                    })
                }
                Some(0) => {
                    self.idle();
                    continue;
                }
                Some(n) => n,
            };
            trace!("read {} of {} requested bytes", n, want);

            frames.extend_from_slice(&self.buf[..n]);
            let whole = frames.len() - frames.len() % frame_bytes;
            if whole > 0 {
                sink.write_frames(&frames[..whole])?;
                written += whole;
                frames.drain(..whole);
            }
        }

        Ok(written)
    }
}

pub mod serial;

pub use serial::{PortConfig, SerialSource};

use crate::error::StreamError;

/// An ordered, byte-producing channel
pub trait ByteSource {
    /// Read up to `buf.len()` bytes.
    ///
    /// `Some(0)` means no data arrived yet and the caller should try again;
    /// `None` means the source is closed for good.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<Option<usize>, StreamError>;
}

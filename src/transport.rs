//! Byte channel to the printer.

use crate::error::Error;

/// Duplex byte stream the printer session talks through.
///
/// `read` and `write` take `&self` so one session can serve several threads;
/// implementations block until the transfer completes or fails. No framing or
/// buffering is expected beyond what the underlying channel provides.
pub trait Transport: Send + Sync {
    /// Read up to `buf.len()` bytes, returning how many were received.
    fn read(&self, buf: &mut [u8]) -> Result<usize, Error>;

    /// Write `buf`, returning how many bytes the channel accepted.
    fn write(&self, buf: &[u8]) -> Result<usize, Error>;

    /// Release the channel.
    fn close(&mut self) -> Result<(), Error>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read(&self, buf: &mut [u8]) -> Result<usize, Error> {
        (**self).read(buf)
    }

    fn write(&self, buf: &[u8]) -> Result<usize, Error> {
        (**self).write(buf)
    }

    fn close(&mut self) -> Result<(), Error> {
        (**self).close()
    }
}

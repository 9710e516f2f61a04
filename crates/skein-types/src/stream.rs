//! Byte stream abstraction used by the transport client.

use std::io;

use crate::error::{Result, SkeinError};

/// A bidirectional byte stream (plain TCP or a TLS session on top of it).
///
/// `read` returning `Ok(0)` means the peer closed the stream.
pub trait NetworkStream: Send {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;
    fn write(&mut self, data: &[u8]) -> Result<usize>;
    fn close(&mut self) -> Result<()>;
}

/// Adapts a `&mut dyn NetworkStream` to `std::io::Read` + `std::io::Write`
/// for code (TLS libraries, readers) that wants the std traits.
pub struct IoAdapter<'a> {
    inner: &'a mut dyn NetworkStream,
}

impl<'a> IoAdapter<'a> {
    pub fn new(inner: &'a mut dyn NetworkStream) -> Self {
        Self { inner }
    }
}

impl io::Read for IoAdapter<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).map_err(into_io)
    }
}

impl io::Write for IoAdapter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).map_err(into_io)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Convert a [`SkeinError`] to [`io::Error`], preserving the original
/// `io::Error` (and its kind) when the variant is `SkeinError::Io`.
pub fn into_io(e: SkeinError) -> io::Error {
    match e {
        SkeinError::Io(io_err) => io_err,
        other => io::Error::other(other.to_string()),
    }
}

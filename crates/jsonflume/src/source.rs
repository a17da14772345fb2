//! Byte-level input and output contracts.
//!
//! The parser and generator only ever touch their sources and sinks through
//! these two traits; everything else (files, sockets, in-memory buffers) is
//! an adapter.

use std::io;

use crate::error::Result;

/// A refillable source of bytes.
pub trait ByteSource {
    /// Fills `buf` with up to `buf.len()` bytes and returns how many were
    /// written. `0` means end of input, and must keep meaning end of input
    /// for every subsequent call.
    fn fill(&mut self, buf: &mut [u8]) -> usize;
}

/// A drain for generated bytes.
pub trait ByteSink {
    /// Writes all of `bytes`.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Pushes any buffering in the sink itself down to its destination.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl ByteSource for &[u8] {
    fn fill(&mut self, buf: &mut [u8]) -> usize {
        let n = self.len().min(buf.len());
        buf[..n].copy_from_slice(&self[..n]);
        *self = &self[n..];
        n
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn fill(&mut self, buf: &mut [u8]) -> usize {
        (**self).fill(buf)
    }
}

impl ByteSink for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Adapts any [`io::Read`] into a [`ByteSource`].
///
/// Read failures surface as end of input; the parser reports them as an
/// unterminated document rather than an I/O error.
#[derive(Debug)]
pub struct ReadSource<R> {
    inner: R,
}

impl<R: io::Read> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: io::Read> ByteSource for ReadSource<R> {
    fn fill(&mut self, buf: &mut [u8]) -> usize {
        loop {
            match self.inner.read(buf) {
                Ok(n) => return n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => return 0,
            }
        }
    }
}

/// Adapts any [`io::Write`] into a [`ByteSink`].
#[derive(Debug)]
pub struct WriteSink<W> {
    inner: W,
}

impl<W: io::Write> WriteSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> ByteSink for WriteSink<W> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_drains_and_stays_empty() {
        let mut src: &[u8] = b"abcdef";
        let mut buf = [0u8; 4];
        assert_eq!(src.fill(&mut buf), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(src.fill(&mut buf), 2);
        assert_eq!(&buf[..2], b"ef");
        assert_eq!(src.fill(&mut buf), 0);
        assert_eq!(src.fill(&mut buf), 0);
    }

    #[test]
    fn read_source_reports_errors_as_eof() {
        struct Failing;
        impl io::Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
        }
        let mut src = ReadSource::new(Failing);
        let mut buf = [0u8; 8];
        assert_eq!(src.fill(&mut buf), 0);
    }
}

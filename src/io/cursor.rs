use byteorder::{ByteOrder, LittleEndian};
use std::io::{self, Read};

use crate::error::{Error, Result};

/// Initial allocation cap for [`ByteCursor::read_exact`].
///
/// Lengths come from untrusted input, so the buffer grows with the bytes
/// actually read instead of being sized from the declared length up front.
const MAX_PREALLOC: usize = 64 * 1024;

/// Sequential reader over a decompressed byte stream.
///
/// Every read either consumes exactly the requested bytes or fails with
/// [`Error::TruncatedInput`]. The cursor knows nothing about the container
/// layout; it only tracks how many bytes have been consumed so far.
pub struct ByteCursor<R> {
    inner: R,
    position: u64,
}

impl<R: Read> ByteCursor<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    /// Number of bytes consumed from the stream.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read exactly `n` bytes into a freshly allocated buffer.
    pub fn read_exact(&mut self, n: usize) -> Result<Vec<u8>> {
        let offset = self.position;
        let mut buf = Vec::with_capacity(n.min(MAX_PREALLOC));
        let result = (&mut self.inner).take(n as u64).read_to_end(&mut buf);
        self.position += buf.len() as u64;

        match result {
            Ok(_) if buf.len() == n => Ok(buf),
            Ok(_) => Err(Error::TruncatedInput {
                offset,
                needed: n,
                available: buf.len(),
            }),
            Err(e) => Err(stream_error(e, offset, n, buf.len())),
        }
    }

    /// Read a fixed number of bytes into a stack buffer.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let offset = self.position;
        let mut buf = [0u8; N];
        let mut filled = 0;

        while filled < N {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.position += filled as u64;
                    return Err(stream_error(e, offset, N, filled));
                }
            }
        }

        self.position += filled as u64;
        if filled < N {
            return Err(Error::TruncatedInput {
                offset,
                needed: N,
                available: filled,
            });
        }
        Ok(buf)
    }

    /// Read a little-endian u32.
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let bytes = self.read_array::<4>()?;
        Ok(LittleEndian::read_u32(&bytes))
    }
}

/// Map an I/O failure of the underlying stream; EOF counts as truncation.
fn stream_error(err: io::Error, offset: u64, needed: usize, available: usize) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::TruncatedInput {
            offset,
            needed,
            available,
        }
    } else {
        Error::Stream(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Yields its data one byte per read call, then fails.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        fail_with: io::ErrorKind,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.pos == self.data.len() {
                return Err(io::Error::from(self.fail_with));
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn reads_little_endian_u32() {
        let mut cursor = ByteCursor::new(Cursor::new(vec![0x01, 0x02, 0x03, 0x04, 0xff]));
        assert_eq!(cursor.read_u32_le().unwrap(), 0x04030201);
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn read_exact_advances_position() {
        let mut cursor = ByteCursor::new(Cursor::new(b"abcdef".to_vec()));
        assert_eq!(cursor.read_exact(2).unwrap(), b"ab");
        assert_eq!(cursor.read_exact(0).unwrap(), b"");
        assert_eq!(cursor.read_exact(4).unwrap(), b"cdef");
        assert_eq!(cursor.position(), 6);
    }

    #[test]
    fn short_block_is_truncated() {
        let mut cursor = ByteCursor::new(Cursor::new(b"abc".to_vec()));
        match cursor.read_exact(5) {
            Err(Error::TruncatedInput {
                offset,
                needed,
                available,
            }) => {
                assert_eq!(offset, 0);
                assert_eq!(needed, 5);
                assert_eq!(available, 3);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn short_integer_is_truncated() {
        let mut cursor = ByteCursor::new(Cursor::new(vec![0xaa, 0xbb, 0x01, 0x00]));
        cursor.read_exact(2).unwrap();
        assert!(matches!(
            cursor.read_u32_le(),
            Err(Error::TruncatedInput {
                offset: 2,
                needed: 4,
                available: 2
            })
        ));
    }

    #[test]
    fn huge_declared_length_does_not_preallocate() {
        let mut cursor = ByteCursor::new(Cursor::new(vec![0u8; 16]));
        assert!(matches!(
            cursor.read_exact(usize::MAX / 2),
            Err(Error::TruncatedInput { available: 16, .. })
        ));
    }

    #[test]
    fn partial_reads_are_stitched_together() {
        let mut cursor = ByteCursor::new(Trickle {
            data: vec![0x10, 0x00, 0x00, 0x00],
            pos: 0,
            fail_with: io::ErrorKind::UnexpectedEof,
        });
        assert_eq!(cursor.read_u32_le().unwrap(), 16);
    }

    #[test]
    fn eof_error_from_stream_is_truncation() {
        let mut cursor = ByteCursor::new(Trickle {
            data: vec![1, 2],
            pos: 0,
            fail_with: io::ErrorKind::UnexpectedEof,
        });
        assert!(matches!(
            cursor.read_exact(8),
            Err(Error::TruncatedInput { available: 2, .. })
        ));
    }

    #[test]
    fn other_stream_errors_are_reported_as_is() {
        let mut cursor = ByteCursor::new(Trickle {
            data: vec![],
            pos: 0,
            fail_with: io::ErrorKind::InvalidData,
        });
        match cursor.read_u32_le() {
            Err(Error::Stream(e)) => assert_eq!(e.kind(), io::ErrorKind::InvalidData),
            other => panic!("expected stream error, got {:?}", other),
        }
    }
}

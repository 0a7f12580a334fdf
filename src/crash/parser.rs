//! Low-level uecrash container parser.
//!
//! Walks the inflated stream strictly forward. Each field's offset depends
//! on every field before it, so a single mis-read corrupts everything after
//! it; any framing problem is returned as a fatal error instead of being
//! skipped.

use byteorder::{ByteOrder, LittleEndian};
use log::debug;
use std::io::Read;

use crate::error::{Error, Result};
use crate::io::ByteCursor;

use super::structures::{ContainerHeader, FileEntry};

/// Decode a length-prefixed text block.
///
/// The text ends at the first zero byte; anything after it up to the declared
/// length is padding. Without a zero byte the whole block is the text.
/// The bytes are returned as-is, with no charset validation.
pub fn decode_text(block: &[u8]) -> Vec<u8> {
    let end = block.iter().position(|&b| b == 0).unwrap_or(block.len());
    block[..end].to_vec()
}

/// Sequential parser for one container.
///
/// Owns the cursor; header and entries must be read in stream order.
pub struct CrashParser<R> {
    cursor: ByteCursor<R>,
}

impl<R: Read> CrashParser<R> {
    /// Create a parser over an already-inflated stream.
    pub fn new(reader: R) -> Self {
        Self {
            cursor: ByteCursor::new(reader),
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Read a little-endian signed 32-bit integer.
    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.cursor.read_array::<4>()?;
        Ok(LittleEndian::read_i32(&bytes))
    }

    /// Read a u32 length followed by that many bytes, cut at the first zero.
    pub fn read_text(&mut self) -> Result<Vec<u8>> {
        let len = self.cursor.read_u32_le()?;
        let block = self.cursor.read_exact(len as usize)?;
        Ok(decode_text(&block))
    }

    /// Read the container header.
    ///
    /// The magic tag is stored but not checked here; see
    /// [`ContainerHeader::magic_warning`].
    pub fn read_header(&mut self) -> Result<ContainerHeader> {
        let magic = self.cursor.read_array::<3>()?;
        let dir_name = self.read_text()?;
        let file_name = self.read_text()?;
        let uncompressed_size = self.read_i32()?;
        let file_count = self.read_i32()?;

        debug!(
            "header: magic=\"{}\" dir=\"{}\" file=\"{}\" uncompressed={} count={}",
            magic.escape_ascii(),
            dir_name.escape_ascii(),
            file_name.escape_ascii(),
            uncompressed_size,
            file_count
        );

        Ok(ContainerHeader {
            magic,
            dir_name,
            file_name,
            uncompressed_size,
            file_count,
        })
    }

    /// Read the record expected at position `expected_index`.
    ///
    /// On an index mismatch nothing after the index is consumed and the
    /// stream can no longer be trusted.
    pub fn read_entry(&mut self, expected_index: i32) -> Result<FileEntry> {
        let offset = self.position();
        let index = self.read_i32()?;
        if index != expected_index {
            return Err(Error::FrameIndexMismatch {
                expected: expected_index,
                found: index,
            });
        }

        let file_name = self.read_text()?;
        let length = self.read_i32()?;
        if length < 0 {
            return Err(Error::InvalidLength {
                field: "payload",
                length,
            });
        }

        debug!(
            "entry {} at offset {}: name=\"{}\" length={}",
            index,
            offset,
            file_name.escape_ascii(),
            length
        );

        let payload = self.cursor.read_exact(length as usize)?;

        Ok(FileEntry {
            index,
            expected_index,
            file_name,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn text(bytes: &[u8]) -> Vec<u8> {
        let mut out = (bytes.len() as u32).to_le_bytes().to_vec();
        out.extend_from_slice(bytes);
        out
    }

    fn minimal_header(count: i32) -> Vec<u8> {
        let mut out = b"CR1".to_vec();
        out.extend(text(b"d\0"));
        out.extend(text(b"a\0"));
        out.extend(0i32.to_le_bytes());
        out.extend(count.to_le_bytes());
        out
    }

    #[test]
    fn text_stops_at_first_zero() {
        assert_eq!(decode_text(b"abc\0\x7fgarbage"), b"abc");
        assert_eq!(decode_text(b"\0abc"), b"");
        assert_eq!(decode_text(b""), b"");
    }

    #[test]
    fn text_without_terminator_uses_whole_block() {
        assert_eq!(
            decode_text(b"CrashContext.runtime-xml"),
            b"CrashContext.runtime-xml"
        );
    }

    #[test]
    fn non_utf8_text_passes_through_unchanged() {
        let mut parser = CrashParser::new(Cursor::new(text(b"\xff\xfe\0junk")));
        assert_eq!(parser.read_text().unwrap(), b"\xff\xfe");

        let mut parser = CrashParser::new(Cursor::new(text(b"log\xe9\x80")));
        assert_eq!(parser.read_text().unwrap(), b"log\xe9\x80");
    }

    #[test]
    fn zero_padded_text_reads_back() {
        let mut block = b"UEMinidump.dmp".to_vec();
        block.resize(260, 0);
        let mut parser = CrashParser::new(Cursor::new(text(&block)));
        assert_eq!(parser.read_text().unwrap(), b"UEMinidump.dmp");
        assert_eq!(parser.position(), 4 + 260);
    }

    #[test]
    fn reads_signed_integers() {
        let mut parser = CrashParser::new(Cursor::new((-2i32).to_le_bytes().to_vec()));
        assert_eq!(parser.read_i32().unwrap(), -2);
    }

    #[test]
    fn reads_header_fields() {
        let mut parser = CrashParser::new(Cursor::new(minimal_header(1)));
        let header = parser.read_header().unwrap();
        assert_eq!(&header.magic, b"CR1");
        assert_eq!(header.dir_name, b"d");
        assert_eq!(header.file_name, b"a");
        assert_eq!(header.uncompressed_size, 0);
        assert_eq!(header.file_count, 1);
    }

    #[test]
    fn header_with_other_magic_still_decodes() {
        let mut data = minimal_header(0);
        data[..3].copy_from_slice(b"CR2");
        let mut parser = CrashParser::new(Cursor::new(data));
        let header = parser.read_header().unwrap();
        assert!(!header.has_expected_magic());
        assert_eq!(header.file_name, b"a");
    }

    #[test]
    fn truncated_header_is_fatal() {
        let data = minimal_header(1);
        let mut parser = CrashParser::new(Cursor::new(data[..data.len() - 2].to_vec()));
        assert!(matches!(
            parser.read_header(),
            Err(Error::TruncatedInput { .. })
        ));
    }

    #[test]
    fn reads_entry() {
        let mut data = 0i32.to_le_bytes().to_vec();
        data.extend(text(b"x.txt\0"));
        data.extend(3i32.to_le_bytes());
        data.extend(b"abc");

        let mut parser = CrashParser::new(Cursor::new(data));
        let entry = parser.read_entry(0).unwrap();
        assert_eq!(entry.index, 0);
        assert_eq!(entry.expected_index, 0);
        assert_eq!(entry.file_name, b"x.txt");
        assert_eq!(entry.payload, b"abc");
    }

    #[test]
    fn index_mismatch_consumes_only_the_index() {
        let mut data = 4i32.to_le_bytes().to_vec();
        data.extend(text(b"x.txt"));

        let mut parser = CrashParser::new(Cursor::new(data));
        match parser.read_entry(1) {
            Err(Error::FrameIndexMismatch { expected, found }) => {
                assert_eq!(expected, 1);
                assert_eq!(found, 4);
            }
            other => panic!("expected index mismatch, got {:?}", other),
        }
        assert_eq!(parser.position(), 4);
    }

    #[test]
    fn negative_payload_length_is_rejected() {
        let mut data = 0i32.to_le_bytes().to_vec();
        data.extend(text(b"x.txt"));
        data.extend((-1i32).to_le_bytes());

        let mut parser = CrashParser::new(Cursor::new(data));
        assert!(matches!(
            parser.read_entry(0),
            Err(Error::InvalidLength { length: -1, .. })
        ));
    }

    #[test]
    fn short_payload_is_truncated() {
        let mut data = 0i32.to_le_bytes().to_vec();
        data.extend(text(b"x.txt"));
        data.extend(10i32.to_le_bytes());
        data.extend(b"abc");

        let mut parser = CrashParser::new(Cursor::new(data));
        assert!(matches!(
            parser.read_entry(0),
            Err(Error::TruncatedInput {
                needed: 10,
                available: 3,
                ..
            })
        ));
    }
}

//! Error types for uecrash decoding and extraction.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while walking a uecrash container.
///
/// Framing errors ([`Error::TruncatedInput`], [`Error::FrameIndexMismatch`],
/// [`Error::InvalidLength`], [`Error::Stream`]) leave the stream position
/// meaningless and stop the whole archive. The rest are reported against a
/// single header or entry and do not affect siblings.
#[derive(Debug, Error)]
pub enum Error {
    /// The stream ended before a field was fully read.
    #[error("truncated input at offset {offset}: needed {needed} bytes but only {available} available")]
    TruncatedInput {
        offset: u64,
        needed: usize,
        available: usize,
    },

    /// The header tag is not `CR1`. Advisory only.
    #[error("unexpected magic: expected \"CR1\", got {found:?}")]
    UnexpectedMagic { found: [u8; 3] },

    /// An entry's embedded index disagrees with its position in the sequence.
    #[error("entry index mismatch: expected {expected}, found {found}")]
    FrameIndexMismatch { expected: i32, found: i32 },

    /// A declared length is negative.
    #[error("invalid {field} length: {length}")]
    InvalidLength { field: &'static str, length: i32 },

    /// The entry name would escape the destination directory.
    #[error("unsafe entry path: {name:?}")]
    UnsafePath { name: String },

    /// Creating a directory or writing the output file failed.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The underlying (decompression) stream failed for a reason other than EOF.
    #[error("stream error: {0}")]
    Stream(#[source] io::Error),
}

impl Error {
    /// Whether this error stops the archive walk.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::TruncatedInput { .. }
                | Error::FrameIndexMismatch { .. }
                | Error::InvalidLength { .. }
                | Error::Stream(_)
        )
    }
}

/// Result type alias using the crate Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_errors_are_fatal() {
        let truncated = Error::TruncatedInput {
            offset: 0,
            needed: 4,
            available: 1,
        };
        assert!(truncated.is_fatal());
        assert!(Error::FrameIndexMismatch { expected: 0, found: 7 }.is_fatal());
        assert!(
            Error::InvalidLength {
                field: "payload",
                length: -1
            }
            .is_fatal()
        );
        assert!(Error::Stream(io::Error::other("corrupt deflate stream")).is_fatal());
    }

    #[test]
    fn per_entry_errors_are_not_fatal() {
        assert!(!Error::UnexpectedMagic { found: *b"CR2" }.is_fatal());
        assert!(
            !Error::UnsafePath {
                name: "../x".to_string()
            }
            .is_fatal()
        );
        let write = Error::WriteFailure {
            path: PathBuf::from("out/x"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(!write.is_fatal());
    }
}

use std::borrow::Cow;
use std::path::PathBuf;

use crate::error::Error;

/// Magic tag at the start of every container.
pub const MAGIC: &[u8; 3] = b"CR1";

/// Container header - read once at the start of the inflated stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub magic: [u8; 3],
    /// Directory name recorded by the archive's creator. Informational only.
    pub dir_name: Vec<u8>,
    /// Name of the original archive. Informational only.
    pub file_name: Vec<u8>,
    /// Declared total size. Never checked against the bytes actually read.
    pub uncompressed_size: i32,
    pub file_count: i32,
}

impl ContainerHeader {
    pub fn has_expected_magic(&self) -> bool {
        &self.magic == MAGIC
    }

    /// The advisory [`Error::UnexpectedMagic`] if the tag is not `CR1`.
    pub fn magic_warning(&self) -> Option<Error> {
        if self.has_expected_magic() {
            None
        } else {
            Some(Error::UnexpectedMagic { found: self.magic })
        }
    }

    /// Number of entries to read. A negative declared count means none.
    pub fn entry_count(&self) -> i32 {
        self.file_count.max(0)
    }
}

/// One decoded file record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Index declared by the record itself.
    pub index: i32,
    /// Position of the record in the sequence.
    pub expected_index: i32,
    /// Raw name bytes as stored in the archive.
    pub file_name: Vec<u8>,
    pub payload: Vec<u8>,
}

/// What happened to one entry after it was decoded
#[derive(Debug)]
pub enum EntryStatus {
    /// Payload written to this path.
    Extracted(PathBuf),
    /// Payload decoded and discarded.
    Listed,
    /// Payload consumed but could not be written.
    Failed(Error),
}

/// Per-entry result kept by the orchestrator
#[derive(Debug)]
pub struct EntryReport {
    pub index: i32,
    pub file_name: Vec<u8>,
    pub size: usize,
    pub status: EntryStatus,
}

impl EntryReport {
    /// Name for display; invalid UTF-8 is replaced.
    pub fn display_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.file_name)
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.status, EntryStatus::Failed(_))
    }
}

/// How the entry loop ended
#[derive(Debug)]
pub enum Completion {
    /// All declared entries were decoded.
    Completed,
    /// A framing error stopped the loop; no later entries were attempted.
    Aborted(Error),
}

/// Result of walking a whole container
#[derive(Debug)]
pub struct ArchiveReport {
    pub header: ContainerHeader,
    /// Advisory conditions that did not stop decoding.
    pub warnings: Vec<Error>,
    pub entries: Vec<EntryReport>,
    pub completion: Completion,
    /// Bytes consumed from the inflated stream.
    pub bytes_consumed: u64,
}

impl ArchiveReport {
    pub fn is_aborted(&self) -> bool {
        matches!(self.completion, Completion::Aborted(_))
    }

    /// The framing error that stopped the loop, if any.
    pub fn abort_error(&self) -> Option<&Error> {
        match &self.completion {
            Completion::Aborted(e) => Some(e),
            Completion::Completed => None,
        }
    }

    /// Number of entries announced by the header.
    pub fn declared_entries(&self) -> usize {
        self.header.entry_count() as usize
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.is_success()).count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &EntryReport> {
        self.entries.iter().filter(|e| !e.is_success())
    }

    /// Completed and every entry succeeded.
    pub fn is_clean(&self) -> bool {
        !self.is_aborted() && self.failed().next().is_none()
    }
}

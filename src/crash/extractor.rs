use log::{error, warn};
use std::fs;
use std::io::{Read, Write};
#[cfg(unix)]
use std::os::unix::ffi::OsStrExt;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

use super::parser::CrashParser;
use super::structures::{ArchiveReport, Completion, EntryReport, EntryStatus, FileEntry};

/// Destination for decoded entry payloads.
///
/// A sink failure only affects the entry it was handed: by the time the sink
/// runs the payload has been consumed, so the stream is still framed.
pub trait EntrySink {
    fn accept(&mut self, entry: &FileEntry) -> Result<EntryStatus>;
}

/// Writes every entry below a root directory
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl EntrySink for DirectorySink {
    fn accept(&mut self, entry: &FileEntry) -> Result<EntryStatus> {
        let output_path = entry_path(&self.root, &entry.file_name)?;

        // Create parent directories if needed
        let parent = output_path.parent().unwrap_or(self.root.as_path());
        fs::create_dir_all(parent).map_err(|source| Error::WriteFailure {
            path: parent.to_path_buf(),
            source,
        })?;

        let write = |path: &Path| -> std::io::Result<()> {
            let mut file = fs::File::create(path)?;
            file.write_all(&entry.payload)?;
            file.flush()
        };
        write(&output_path).map_err(|source| Error::WriteFailure {
            path: output_path.clone(),
            source,
        })?;

        Ok(EntryStatus::Extracted(output_path))
    }
}

/// Accepts every entry without writing anything
#[derive(Debug, Default)]
pub struct ListingSink;

impl EntrySink for ListingSink {
    fn accept(&mut self, _entry: &FileEntry) -> Result<EntryStatus> {
        Ok(EntryStatus::Listed)
    }
}

/// Resolve an archive-declared name to a path inside `root`.
///
/// Name bytes are used unchanged. Both `/` and `\` separate segments. `.`
/// segments are dropped. Empty names, `..` segments, rooted paths and drive
/// prefixes are rejected with [`Error::UnsafePath`], as are names that are not
/// valid UTF-8 on platforms without byte-string paths.
pub fn entry_path(root: &Path, name: &[u8]) -> Result<PathBuf> {
    let unsafe_path = || Error::UnsafePath {
        name: name.escape_ascii().to_string(),
    };

    let normalized: Vec<u8> = name
        .iter()
        .map(|&b| if b == b'\\' { b'/' } else { b })
        .collect();
    let relative = raw_path(&normalized).ok_or_else(unsafe_path)?;
    let mut path = root.to_path_buf();
    let mut pushed = false;

    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                path.push(part);
                pushed = true;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_path());
            }
        }
    }

    // "C:foo" is a plain file name on unix but a drive-relative path elsewhere
    let has_drive = normalized.get(1) == Some(&b':') && normalized[0].is_ascii_alphabetic();
    if !pushed || has_drive {
        return Err(unsafe_path());
    }

    Ok(path)
}

#[cfg(unix)]
fn raw_path(bytes: &[u8]) -> Option<&Path> {
    Some(Path::new(std::ffi::OsStr::from_bytes(bytes)))
}

#[cfg(not(unix))]
fn raw_path(bytes: &[u8]) -> Option<&Path> {
    std::str::from_utf8(bytes).ok().map(Path::new)
}

/// uecrash archive orchestrator
///
/// Reads the header once, then exactly `file_count` entries in order,
/// handing each payload to an [`EntrySink`].
pub struct CrashExtractor<R> {
    parser: CrashParser<R>,
}

impl<R: Read> CrashExtractor<R> {
    /// Create an extractor over an already-inflated stream.
    pub fn new(reader: R) -> Self {
        Self {
            parser: CrashParser::new(reader),
        }
    }

    /// Walk the container, feeding every entry to `sink`.
    ///
    /// Returns `Err` only if the header itself cannot be read. Framing errors
    /// inside the entry loop end up in [`ArchiveReport::completion`]; sink
    /// failures are recorded on the entry and the loop goes on.
    pub fn run<S: EntrySink>(mut self, sink: &mut S) -> Result<ArchiveReport> {
        let header = self.parser.read_header()?;

        let mut warnings = Vec::new();
        if let Some(warning) = header.magic_warning() {
            warn!("{}; continuing", warning);
            warnings.push(warning);
        }

        let mut entries = Vec::new();
        let mut completion = Completion::Completed;

        for expected_index in 0..header.entry_count() {
            let entry = match self.parser.read_entry(expected_index) {
                Ok(entry) => entry,
                Err(e) => {
                    error!(
                        "aborting after {} of {} entries: {}",
                        expected_index,
                        header.entry_count(),
                        e
                    );
                    completion = Completion::Aborted(e);
                    break;
                }
            };

            let status = match sink.accept(&entry) {
                Ok(status) => status,
                Err(e) => {
                    warn!(
                        "entry {} (\"{}\"): {}",
                        entry.index,
                        entry.file_name.escape_ascii(),
                        e
                    );
                    EntryStatus::Failed(e)
                }
            };

            entries.push(EntryReport {
                index: entry.index,
                file_name: entry.file_name,
                size: entry.payload.len(),
                status,
            });
        }

        Ok(ArchiveReport {
            header,
            warnings,
            entries,
            completion,
            bytes_consumed: self.parser.position(),
        })
    }

    /// Extract every entry below `dest`.
    pub fn extract_to_dir(self, dest: &Path) -> Result<ArchiveReport> {
        self.run(&mut DirectorySink::new(dest))
    }

    /// Decode every entry without writing anything.
    pub fn list(self) -> Result<ArchiveReport> {
        self.run(&mut ListingSink)
    }
}

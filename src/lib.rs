//! # uecrash
//!
//! Extract files from uecrash crash report containers.
//!
//! A uecrash archive is one zlib-compressed stream holding a small `CR1`
//! header followed by a sequence of length-prefixed file records. This crate
//! inflates the stream, walks the records strictly in order and writes each
//! payload below a destination directory.
//!
//! ## Features
//!
//! - Header and entry decoding with explicit framing errors
//! - Per-entry failure isolation: one unwritable file does not lose the rest
//! - Entry names are confined to the destination directory
//! - Listing mode that validates an archive without writing anything
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use uecrash::{CrashExtractor, LocalArchive};
//!
//! fn main() -> anyhow::Result<()> {
//!     let archive = LocalArchive::open(Path::new("UECC-Windows.uecrash"))?;
//!     let report = CrashExtractor::new(archive.decompressed())
//!         .extract_to_dir(Path::new("crash"))?;
//!
//!     for entry in &report.entries {
//!         println!("{} ({} bytes)", entry.display_name(), entry.size);
//!     }
//!     if let Some(err) = report.abort_error() {
//!         eprintln!("archive aborted: {}", err);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod crash;
pub mod error;
pub mod io;

pub use cli::Cli;
pub use crash::{ArchiveReport, CrashExtractor, EntryReport, EntryStatus};
pub use error::{Error, Result};
pub use io::{ByteCursor, LocalArchive};

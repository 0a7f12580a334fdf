//! uecrash container parsing and extraction.
//!
//! ## Architecture
//!
//! - [`structures`]: header, entry and report types
//! - [`parser`]: primitive decoders plus header and entry framing
//! - [`extractor`]: the orchestrator loop and the sinks payloads are written to
//!
//! ## Container Format
//!
//! The archive file is a single zlib stream. Once inflated it holds, with all
//! integers little-endian:
//!
//! ```text
//! header   magic "CR1" (3 bytes)
//!          dir name      u32 length + bytes, text ends at first 0x00
//!          file name     u32 length + bytes, same rule
//!          uncompressed  i32
//!          file count    i32
//! entry    index         i32, must equal the entry's position
//!  (x N)   file name     u32 length + bytes
//!          length        i32, must be >= 0
//!          payload       `length` bytes
//! ```
//!
//! There are no offsets, checksums or resync markers. A bad index, a negative
//! length or a short read therefore stops the walk for the whole archive,
//! while a failure to write one payload only fails that entry.

mod extractor;
mod parser;
mod structures;

pub use extractor::{CrashExtractor, DirectorySink, EntrySink, ListingSink, entry_path};
pub use parser::{CrashParser, decode_text};
pub use structures::*;

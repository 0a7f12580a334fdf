use flate2::read::ZlibDecoder;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// A uecrash archive on the local filesystem.
///
/// The whole file is one zlib stream; [`LocalArchive::decompressed`] hands
/// out the inflated bytes for the container parser.
pub struct LocalArchive {
    path: PathBuf,
    file: File,
    size: u64,
}

impl LocalArchive {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("cannot open archive '{}'", path.display()))?;
        let size = file
            .metadata()
            .with_context(|| format!("cannot stat archive '{}'", path.display()))?
            .len();
        Ok(Self {
            path: path.to_path_buf(),
            file,
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the compressed file on disk.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Consume the archive and return a reader over the inflated container.
    ///
    /// The file handle is closed when the returned decoder is dropped.
    pub fn decompressed(self) -> ZlibDecoder<BufReader<File>> {
        ZlibDecoder::new(BufReader::new(self.file))
    }
}

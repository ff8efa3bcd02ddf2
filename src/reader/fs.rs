//! Filesystem backend reader
//!
//! Resolves relative paths against a root directory and opens them as
//! regular files. The root must exist when the reader is constructed;
//! individual records are allowed to be missing (that is a per-record
//! retrieval error, not a configuration error).

use crate::error::{ConfigError, ConfigResult};
use crate::reader::BackendReader;
use crate::record::ContentHandle;
use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Reader over a directory tree of record files
pub struct FsReader {
    root: PathBuf,
}

impl FsReader {
    /// Create a reader rooted at `root`
    pub fn new<P: AsRef<Path>>(root: P) -> ConfigResult<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.is_dir() {
            return Err(ConfigError::InvalidReaderUri {
                uri: format!("fs://{}", root.display()),
                reason: "root is not a directory".to_string(),
            });
        }

        debug!(root = %root.display(), "opened fs reader");
        Ok(Self { root })
    }

    /// The root directory this reader resolves against
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BackendReader for FsReader {
    fn read(&self, rel_path: &str) -> io::Result<Box<dyn ContentHandle + Send>> {
        // Relative paths come from identifier derivation, but readers are
        // also callable directly; refuse anything that escapes the root.
        let rel = Path::new(rel_path);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("path '{}' is not a plain relative path", rel_path),
            ));
        }

        let abs = self.root.join(rel);
        let fh = File::open(&abs)?;
        Ok(Box::new(fh))
    }
}

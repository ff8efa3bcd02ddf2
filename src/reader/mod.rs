//! Backend readers
//!
//! A backend reader maps a backend-relative path to an open, seekable
//! content handle. The engine treats the reader as an opaque capability:
//! any read failure is wrapped with path and identifier context upstream.
//!
//! Readers are designated by URI:
//! - `fs:///data/records` — files under a root directory
//! - `mem://` — in-memory map, for fixtures and tests
//! - `null://` — every read fails with not-found

pub mod fs;
pub mod mem;

pub use fs::FsReader;
pub use mem::MemReader;

use crate::error::{ConfigError, ConfigResult};
use crate::record::ContentHandle;
use std::io;

/// A storage backend that resolves relative paths to readable content
///
/// Returned handles are positioned at 0. `close` releases reader-held
/// resources; it is not responsible for handles already given out.
pub trait BackendReader: Send + Sync {
    /// Open the content at `rel_path`
    fn read(&self, rel_path: &str) -> io::Result<Box<dyn ContentHandle + Send>>;

    /// Release reader-held resources
    fn close(&self) -> io::Result<()> {
        Ok(())
    }
}

/// A reader whose every read fails with not-found
///
/// Useful for exercising retrieval error paths without touching storage.
pub struct NullReader;

impl BackendReader for NullReader {
    fn read(&self, rel_path: &str) -> io::Result<Box<dyn ContentHandle + Send>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("null reader has no content at '{}'", rel_path),
        ))
    }
}

/// Construct a backend reader from its designating URI
pub fn new_reader(uri: &str) -> ConfigResult<Box<dyn BackendReader>> {
    let (scheme, rest) = uri.split_once("://").ok_or_else(|| {
        ConfigError::InvalidReaderUri {
            uri: uri.to_string(),
            reason: "expected '<scheme>://...'".to_string(),
        }
    })?;

    match scheme {
        "fs" => {
            let reader = FsReader::new(rest)?;
            Ok(Box::new(reader))
        }
        "mem" => Ok(Box::new(MemReader::new())),
        "null" => Ok(Box::new(NullReader)),
        _ => Err(ConfigError::UnknownReaderScheme {
            scheme: scheme.to_string(),
        }),
    }
}

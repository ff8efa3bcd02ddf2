//! In-memory backend reader
//!
//! Holds record bodies in a map keyed by relative path. Reads hand out a
//! cursor over a copy of the body, so a handle stays valid even if the
//! entry is replaced afterwards. Primarily used for fixtures and tests.

use crate::reader::BackendReader;
use crate::record::ContentHandle;
use std::collections::HashMap;
use std::io::{self, Cursor};
use std::sync::RwLock;

/// Reader over an in-memory path → bytes map
#[derive(Default)]
pub struct MemReader {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the content at `rel_path`
    pub fn put(&self, rel_path: impl Into<String>, body: impl Into<Vec<u8>>) {
        let mut entries = self.entries.write().expect("mem reader lock poisoned");
        entries.insert(rel_path.into(), body.into());
    }

    /// Remove the content at `rel_path`, returning whether it existed
    pub fn remove(&self, rel_path: &str) -> bool {
        let mut entries = self.entries.write().expect("mem reader lock poisoned");
        entries.remove(rel_path).is_some()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().expect("mem reader lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BackendReader for MemReader {
    fn read(&self, rel_path: &str) -> io::Result<Box<dyn ContentHandle + Send>> {
        let entries = self.entries.read().expect("mem reader lock poisoned");
        match entries.get(rel_path) {
            Some(body) => Ok(Box::new(Cursor::new(body.clone()))),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no content at '{}'", rel_path),
            )),
        }
    }
}

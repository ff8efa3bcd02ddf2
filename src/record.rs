//! The record model
//!
//! A [`Record`] pairs a resolved path with an open content handle. The
//! engine constructs records and hands exclusive ownership to the caller at
//! yield time; dropping the body closes it. Handles the engine short-circuits
//! (filtered out, or failed before yield) never become records.

use std::io::{Read, Seek};

/// An open, seekable content handle
///
/// Backend readers return these positioned at 0. The filter chain may leave
/// the position anywhere; the engine rewinds before yielding.
pub trait ContentHandle: Read + Seek {}

impl<T: Read + Seek> ContentHandle for T {}

/// One record yielded by the iteration engine
///
/// The body's read position is at the start of the content at yield time,
/// regardless of whether a filter consumed bytes from it first.
pub struct Record {
    path: String,
    body: Box<dyn ContentHandle + Send>,
}

impl Record {
    pub(crate) fn new(path: String, body: Box<dyn ContentHandle + Send>) -> Self {
        Self { path, body }
    }

    /// The backend-relative path this record was read from
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Borrow the content handle
    pub fn body(&mut self) -> &mut (dyn ContentHandle + Send) {
        &mut *self.body
    }

    /// Consume the record, returning its path and content handle
    pub fn into_parts(self) -> (String, Box<dyn ContentHandle + Send>) {
        (self.path, self.body)
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record").field("path", &self.path).finish()
    }
}

//! Error types for recstream
//!
//! This module defines the error hierarchy that covers:
//! - Engine construction and configuration errors
//! - Per-record iteration errors (delivered as stream elements)
//! - Resource release errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Per-record errors never abort the stream; the caller decides
//! - Preserve error chains for debugging

use std::io;
use thiserror::Error;

/// Top-level error type for the recstream engine
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (engine construction)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Engine has been closed and cannot start new streams
    #[error("Iterator has been closed")]
    Closed,

    /// Another stream on this engine is still live
    #[error("Iterator is busy: a stream is already in flight")]
    Busy,

    /// Releasing engine resources failed
    #[error("Close error: {0}")]
    Close(#[from] CloseError),
}

/// Configuration errors, fatal at construction time
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse the iterator URI
    #[error("Invalid iterator URI '{uri}': {reason}")]
    InvalidIteratorUri { uri: String, reason: String },

    /// Reader URI missing from the iterator URI
    #[error("Iterator URI '{uri}' does not designate a reader")]
    MissingReader { uri: String },

    /// No reader registered for the scheme
    #[error("Unknown reader scheme '{scheme}'")]
    UnknownReaderScheme { scheme: String },

    /// Reader URI is malformed or its target is unusable
    #[error("Invalid reader URI '{uri}': {reason}")]
    InvalidReaderUri { uri: String, reason: String },

    /// Filter rule could not be parsed
    #[error("Invalid filter rule '{rule}': {reason}")]
    InvalidFilterRule { rule: String, reason: String },

    /// Filter mode selector is not ALL or ANY
    #[error("Invalid filter mode '{mode}': must be ALL or ANY")]
    InvalidFilterMode { mode: String },
}

/// Per-record errors, delivered to the caller as elements of the stream
///
/// None of these abort the stream: each is scoped to a single identifier
/// and the caller chooses whether to keep pulling.
#[derive(Error, Debug)]
pub enum IterateError {
    /// Identifier is malformed
    #[error("Failed to parse identifier '{identifier}': {reason}")]
    Parse { identifier: String, reason: String },

    /// Parsed identifier cannot be turned into a relative path
    #[error("Failed to derive relative path for '{identifier}': {reason}")]
    PathResolution { identifier: String, reason: String },

    /// Backend failed to produce content for the resolved path
    #[error("Failed to read path '{path}' for '{identifier}': {source}")]
    Retrieval {
        identifier: String,
        path: String,
        source: io::Error,
    },

    /// Filter evaluation itself failed (not "dropped")
    #[error("Filter evaluation failed for '{path}' ('{identifier}'): {reason}")]
    Filter {
        identifier: String,
        path: String,
        reason: String,
    },

    /// Content could not be repositioned after filtering
    #[error("Failed to rewind content for '{path}' ('{identifier}'): {source}")]
    Rewind {
        identifier: String,
        path: String,
        source: io::Error,
    },
}

impl IterateError {
    /// The identifier this error is scoped to
    pub fn identifier(&self) -> &str {
        match self {
            IterateError::Parse { identifier, .. } => identifier,
            IterateError::PathResolution { identifier, .. } => identifier,
            IterateError::Retrieval { identifier, .. } => identifier,
            IterateError::Filter { identifier, .. } => identifier,
            IterateError::Rewind { identifier, .. } => identifier,
        }
    }

    /// Check if this error is recoverable (the stream may continue)
    ///
    /// Every per-record error is recoverable; only construction-time
    /// configuration errors are fatal.
    pub fn is_recoverable(&self) -> bool {
        true
    }
}

/// Resource release errors
#[derive(Error, Debug)]
pub enum CloseError {
    /// Backend reader failed to release its resources
    #[error("Failed to close backend reader: {0}")]
    Reader(#[from] io::Error),
}

/// Result type alias for Error
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for ConfigError
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

//! recstream - Streaming Record Iterator
//!
//! Streams a collection of identified records out of a pluggable storage
//! backend as a single filtered, lazily-produced sequence. Callers supply
//! opaque record identifiers; the engine resolves each one to a
//! backend-relative path, retrieves the content, optionally applies an
//! include/exclude filter chain, and yields surviving records one at a
//! time. Per-record errors are elements of the sequence; the caller
//! decides whether to keep pulling.
//!
//! # Architecture
//!
//! ```text
//! identifiers ──► ┌──────────────────────────────────────────┐
//!                 │            RecordIterator                │
//!                 │                                          │
//!                 │  parse ─► resolve path ─► seen += 1      │
//!                 │            │                             │
//!                 │            ▼                             │
//!                 │      BackendReader (fs:// mem:// ...)    │
//!                 │            │                             │
//!                 │            ▼                             │
//!                 │      QueryFilters ──drop──► (no element) │
//!                 │            │keep                         │
//!                 │            ▼                             │
//!                 │        rewind to 0                       │
//!                 └────────────┬─────────────────────────────┘
//!                              │ pull-driven
//!                              ▼
//!                   Iterator<Item = Result<Record, IterateError>>
//! ```
//!
//! # Example
//!
//! ```no_run
//! use recstream::{IterConfig, RecordIterator};
//!
//! let config = IterConfig::parse(
//!     "reader://?reader=fs:///data/records&include=properties.placetype=locality",
//! )?;
//! let engine = RecordIterator::new(config)?;
//!
//! for result in engine.stream(["102527513", "102527513-alt-quattroshapes"])? {
//!     match result {
//!         Ok(record) => println!("{}", record.path()),
//!         Err(err) => eprintln!("skipping {}: {}", err.identifier(), err),
//!     }
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod filters;
pub mod ident;
pub mod iterate;
pub mod progress;
pub mod reader;
pub mod record;

pub use config::{CliArgs, IterConfig, RunConfig};
pub use error::{CloseError, ConfigError, Error, IterateError, Result};
pub use filters::{FilterMode, QueryFilters};
pub use iterate::{RecordIterator, RecordStream};
pub use reader::{BackendReader, FsReader, MemReader};
pub use record::{ContentHandle, Record};

//! The iteration engine
//!
//! [`RecordIterator`] turns a list of record identifiers into a lazy,
//! single-pass stream of `(record | error)` elements. Per identifier, in
//! input order: parse, derive the backend-relative path, count it as seen,
//! retrieve the content, apply the filter chain, rewind, yield. Nothing
//! past the identifier currently being pulled is touched.
//!
//! Per-record failures are stream elements, not stream aborts: the caller
//! keeps pulling to continue or stops pulling (drops the stream) to cancel.
//! Records dropped by the filter chain produce no element at all.
//!
//! The `seen` counter and `running` flag are atomics, readable from any
//! thread while a stream is in flight. One stream at a time per engine:
//! starting a second returns [`Error::Busy`].

use crate::config::IterConfig;
use crate::error::{CloseError, ConfigResult, Error, IterateError, Result};
use crate::filters::QueryFilters;
use crate::ident::parse_identifier;
use crate::reader::{new_reader, BackendReader};
use crate::record::Record;
use std::io::{Seek, SeekFrom};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Streaming record iterator over a backend reader
pub struct RecordIterator {
    reader: Box<dyn BackendReader>,
    filters: Option<QueryFilters>,

    /// Identifiers whose retrieval was attempted, across all streams
    seen: AtomicU64,

    /// True while a stream on this engine is live
    running: AtomicBool,

    closed: AtomicBool,

    /// Raised to make any live stream terminate at its next pull
    shutdown: Arc<AtomicBool>,
}

/// What processing one identifier produced
enum Outcome {
    Record(Record),
    Skipped,
    Error(IterateError),
}

impl RecordIterator {
    /// Build an engine from a typed configuration
    pub fn new(config: IterConfig) -> ConfigResult<Self> {
        let reader = new_reader(&config.reader_uri)?;
        let filters = QueryFilters::new(
            &config.include,
            &config.exclude,
            config.include_mode,
            config.exclude_mode,
        )?;

        Ok(Self::with_reader(reader, filters))
    }

    /// Build an engine around an already-constructed reader
    pub fn with_reader(reader: Box<dyn BackendReader>, filters: Option<QueryFilters>) -> Self {
        Self {
            reader,
            filters,
            seen: AtomicU64::new(0),
            running: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start a production call over `identifiers`
    ///
    /// Fails with [`Error::Closed`] after [`close`](Self::close), or
    /// [`Error::Busy`] while another stream on this engine is live.
    pub fn stream<I, S>(&self, identifiers: I) -> Result<RecordStream<'_>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::Closed);
        }

        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::Busy);
        }

        let identifiers: Vec<String> = identifiers.into_iter().map(Into::into).collect();
        debug!(identifiers = identifiers.len(), "starting stream");

        Ok(RecordStream {
            engine: self,
            identifiers: identifiers.into_iter(),
            finished: false,
        })
    }

    /// Identifiers whose content retrieval was attempted so far
    ///
    /// Accumulates across streams; never reset. Safe to call from any
    /// thread, including while a stream is in flight.
    pub fn seen(&self) -> u64 {
        self.seen.load(Ordering::Relaxed)
    }

    /// Whether a stream on this engine is currently live
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Cross-thread cancellation handle
    ///
    /// Raising the flag makes any live stream terminate at its next pull.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Release engine-held resources
    ///
    /// Idempotent. Records already yielded stay valid; they are owned by
    /// the caller, not the engine.
    pub fn close(&self) -> std::result::Result<(), CloseError> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.reader.close()?;
        }
        Ok(())
    }

    /// Process a single identifier through parse → resolve → read →
    /// filter → rewind
    fn process(&self, identifier: &str) -> Outcome {
        let parsed = match parse_identifier(identifier) {
            Ok(parsed) => parsed,
            Err(reason) => {
                return Outcome::Error(IterateError::Parse {
                    identifier: identifier.to_string(),
                    reason,
                });
            }
        };

        let rel_path = match parsed.rel_path() {
            Ok(path) => path,
            Err(reason) => {
                return Outcome::Error(IterateError::PathResolution {
                    identifier: identifier.to_string(),
                    reason,
                });
            }
        };

        // Counted once per identifier that resolves, whatever happens in
        // the fetch/filter stages after this point.
        self.seen.fetch_add(1, Ordering::Relaxed);

        let mut fh = match self.reader.read(&rel_path) {
            Ok(fh) => fh,
            Err(source) => {
                return Outcome::Error(IterateError::Retrieval {
                    identifier: identifier.to_string(),
                    path: rel_path,
                    source,
                });
            }
        };

        if let Some(filters) = &self.filters {
            match filters.apply(fh.as_mut()) {
                Err(reason) => {
                    return Outcome::Error(IterateError::Filter {
                        identifier: identifier.to_string(),
                        path: rel_path,
                        reason,
                    });
                }
                Ok(false) => {
                    debug!(path = %rel_path, "record dropped by filters");
                    return Outcome::Skipped;
                }
                Ok(true) => {
                    // Filters consumed the handle; the caller gets it back
                    // positioned at the start.
                    if let Err(source) = fh.seek(SeekFrom::Start(0)) {
                        return Outcome::Error(IterateError::Rewind {
                            identifier: identifier.to_string(),
                            path: rel_path,
                            source,
                        });
                    }
                }
            }
        }

        Outcome::Record(Record::new(rel_path, fh))
    }
}

impl Drop for RecordIterator {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("failed to close backend reader: {}", e);
        }
    }
}

/// One production call's lazy stream of records and per-record errors
///
/// Pull-driven: each `next` processes at most one not-yet-dropped
/// identifier. Dropping the stream (or just not pulling again) is the
/// "stop consuming" signal; no further content is fetched.
pub struct RecordStream<'a> {
    engine: &'a RecordIterator,
    identifiers: std::vec::IntoIter<String>,
    finished: bool,
}

impl RecordStream<'_> {
    fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            self.engine.running.store(false, Ordering::SeqCst);
            debug!("stream finished");
        }
    }
}

impl Iterator for RecordStream<'_> {
    type Item = std::result::Result<Record, IterateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            if self.engine.shutdown.load(Ordering::SeqCst) {
                debug!("shutdown flag raised, ending stream");
                self.finish();
                return None;
            }

            let identifier = match self.identifiers.next() {
                Some(identifier) => identifier,
                None => {
                    self.finish();
                    return None;
                }
            };

            match self.engine.process(&identifier) {
                Outcome::Record(record) => return Some(Ok(record)),
                Outcome::Skipped => continue,
                Outcome::Error(err) => {
                    warn!(identifier = %identifier, "record error: {}", err);
                    return Some(Err(err));
                }
            }
        }
    }
}

impl Drop for RecordStream<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

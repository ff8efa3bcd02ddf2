//! Configuration types for recstream
//!
//! This module defines:
//! - The typed engine configuration ([`IterConfig`])
//! - The iterator-URI string adapter that produces one
//! - CLI argument parsing using clap derive macros
//!
//! The engine itself is constructed from the typed struct only; the
//! URI-string form exists for callers (and the CLI) that carry their whole
//! configuration in one string:
//!
//! ```text
//! reader://?reader=fs:///data/records&include=properties.placetype=locality&include_mode=ALL
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::filters::FilterMode;
use clap::Parser;

/// Scheme expected on iterator URIs
const ITERATOR_SCHEME: &str = "reader";

/// Typed configuration for the iteration engine
#[derive(Debug, Clone, Default)]
pub struct IterConfig {
    /// URI designating the backend reader (e.g. `fs:///data/records`)
    pub reader_uri: String,

    /// Include rules (`<dotted.path>=<regex>`)
    pub include: Vec<String>,

    /// Exclude rules (`<dotted.path>=<regex>`)
    pub exclude: Vec<String>,

    /// How multiple include rules combine
    pub include_mode: FilterMode,

    /// How multiple exclude rules combine
    pub exclude_mode: FilterMode,
}

impl IterConfig {
    /// Typed constructor for callers that do not use the URI form
    pub fn new(reader_uri: impl Into<String>) -> Self {
        Self {
            reader_uri: reader_uri.into(),
            ..Self::default()
        }
    }

    /// Parse an iterator URI into a typed configuration
    ///
    /// Recognized query keys: `reader` (required, once), `include` and
    /// `exclude` (repeatable), `include_mode` and `exclude_mode`
    /// (ALL or ANY, default ALL). Query values must not contain `&`.
    pub fn parse(uri: &str) -> ConfigResult<Self> {
        let invalid = |reason: &str| ConfigError::InvalidIteratorUri {
            uri: uri.to_string(),
            reason: reason.to_string(),
        };

        let (scheme, rest) = uri
            .split_once("://")
            .ok_or_else(|| invalid("expected 'reader://?...'"))?;

        if scheme != ITERATOR_SCHEME {
            return Err(invalid(&format!("unknown scheme '{}'", scheme)));
        }

        let query = match rest.split_once('?') {
            Some(("", q)) => q,
            Some((host, _)) => {
                return Err(invalid(&format!("unexpected authority '{}'", host)));
            }
            None if rest.is_empty() => "",
            None => return Err(invalid("expected '?' before query parameters")),
        };

        let mut config = Self::default();
        let mut saw_reader = false;

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| invalid(&format!("query parameter '{}' has no value", pair)))?;

            match key {
                "reader" => {
                    if saw_reader {
                        return Err(invalid("duplicate 'reader' parameter"));
                    }
                    config.reader_uri = value.to_string();
                    saw_reader = true;
                }
                "include" => config.include.push(value.to_string()),
                "exclude" => config.exclude.push(value.to_string()),
                "include_mode" => config.include_mode = value.parse()?,
                "exclude_mode" => config.exclude_mode = value.parse()?,
                _ => return Err(invalid(&format!("unknown query parameter '{}'", key))),
            }
        }

        if !saw_reader {
            return Err(ConfigError::MissingReader {
                uri: uri.to_string(),
            });
        }

        Ok(config)
    }
}

/// Stream records from a storage backend with include/exclude filtering
#[derive(Parser, Debug, Clone)]
#[command(
    name = "recstream",
    version,
    about = "Stream records from a storage backend with include/exclude filtering",
    long_about = "Resolves record identifiers to backend paths, retrieves each record,\n\
                  applies optional include/exclude filters, and reports a count of\n\
                  surviving records and per-record errors.",
    after_help = "EXAMPLES:\n    \
        recstream -i 'reader://?reader=fs:///data/records' 102527513\n    \
        recstream -i 'reader://?reader=fs:///data/records&include=properties.placetype=locality' 101 102 103\n    \
        recstream -i 'reader://?reader=null://' -p 1 2 3"
)]
pub struct CliArgs {
    /// Iterator URI (reader://?reader=<uri>&include=...&exclude=...)
    #[arg(short = 'i', long, value_name = "URI")]
    pub iterator_uri: String,

    /// Record identifiers to stream
    #[arg(value_name = "IDENTIFIER", required = true)]
    pub identifiers: Vec<String>,

    /// Show a live progress spinner
    #[arg(short = 'p', long)]
    pub progress: bool,

    /// Quiet mode - suppress the summary
    #[arg(short = 'q', long, conflicts_with = "progress")]
    pub quiet: bool,

    /// Verbose output (debug-level logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Stop consuming at the first per-record error
    #[arg(long)]
    pub fail_fast: bool,
}

/// Validated runtime configuration for the CLI
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub config: IterConfig,
    pub identifiers: Vec<String>,
    pub show_progress: bool,
    pub quiet: bool,
    pub fail_fast: bool,
}

impl RunConfig {
    /// Validate CLI arguments and parse the iterator URI
    pub fn from_args(args: CliArgs) -> ConfigResult<Self> {
        let config = IterConfig::parse(&args.iterator_uri)?;

        Ok(Self {
            config,
            identifiers: args.identifiers,
            show_progress: args.progress,
            quiet: args.quiet,
            fail_fast: args.fail_fast,
        })
    }
}

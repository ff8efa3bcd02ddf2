//! Include/exclude filtering of record bodies
//!
//! A filter rule is `<dotted.json.path>=<regex>`: the body is parsed as
//! JSON, the value at the dotted path is rendered to text, and the regex is
//! matched against it. Include rules decide whether a record qualifies at
//! all; exclude rules veto qualifying records. Each side combines its rules
//! under an `All` or `Any` mode.
//!
//! The chain consumes bytes from the handle it is given and leaves the read
//! position wherever evaluation ended. It never closes the handle; the
//! engine rewinds before yielding.

use crate::error::{ConfigError, ConfigResult};
use crate::record::ContentHandle;
use regex::Regex;
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

/// How multiple rules on one side combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Every rule must match
    #[default]
    All,
    /// At least one rule must match
    Any,
}

impl FromStr for FilterMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ALL" => Ok(FilterMode::All),
            "ANY" => Ok(FilterMode::Any),
            _ => Err(ConfigError::InvalidFilterMode {
                mode: s.to_string(),
            }),
        }
    }
}

/// One `path=regex` rule
#[derive(Debug)]
struct QueryRule {
    path: String,
    pattern: Regex,
}

impl QueryRule {
    fn parse(rule: &str) -> ConfigResult<Self> {
        let (path, pattern) = rule.split_once('=').ok_or_else(|| {
            ConfigError::InvalidFilterRule {
                rule: rule.to_string(),
                reason: "expected '<path>=<regex>'".to_string(),
            }
        })?;

        if path.is_empty() {
            return Err(ConfigError::InvalidFilterRule {
                rule: rule.to_string(),
                reason: "empty path".to_string(),
            });
        }

        let pattern = Regex::new(pattern).map_err(|e| ConfigError::InvalidFilterRule {
            rule: rule.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            path: path.to_string(),
            pattern,
        })
    }

    fn matches(&self, doc: &Value) -> bool {
        match lookup(doc, &self.path).and_then(render) {
            Some(text) => self.pattern.is_match(&text),
            None => false,
        }
    }
}

/// Include/exclude filter chain over JSON record bodies
#[derive(Debug, Default)]
pub struct QueryFilters {
    includes: Vec<QueryRule>,
    excludes: Vec<QueryRule>,
    include_mode: FilterMode,
    exclude_mode: FilterMode,
}

impl QueryFilters {
    /// Build a chain from rule strings
    ///
    /// Returns `None` when there are no rules at all, since an empty chain
    /// keeps everything and the engine can skip filtering entirely.
    pub fn new(
        include: &[String],
        exclude: &[String],
        include_mode: FilterMode,
        exclude_mode: FilterMode,
    ) -> ConfigResult<Option<Self>> {
        if include.is_empty() && exclude.is_empty() {
            return Ok(None);
        }

        let includes = include
            .iter()
            .map(|r| QueryRule::parse(r))
            .collect::<ConfigResult<Vec<_>>>()?;
        let excludes = exclude
            .iter()
            .map(|r| QueryRule::parse(r))
            .collect::<ConfigResult<Vec<_>>>()?;

        Ok(Some(Self {
            includes,
            excludes,
            include_mode,
            exclude_mode,
        }))
    }

    /// Evaluate the chain against a content handle
    ///
    /// Returns `Ok(true)` to keep the record, `Ok(false)` to drop it, or a
    /// reason string when evaluation itself failed. The handle's position
    /// is unspecified afterwards.
    pub fn apply(&self, fh: &mut (dyn ContentHandle + Send)) -> Result<bool, String> {
        let mut body = Vec::new();
        fh.read_to_end(&mut body)
            .map_err(|e| format!("failed to read content: {}", e))?;

        let doc: Value = serde_json::from_slice(&body)
            .map_err(|e| format!("failed to parse content as JSON: {}", e))?;

        if !self.includes.is_empty() {
            let included = match self.include_mode {
                FilterMode::All => self.includes.iter().all(|r| r.matches(&doc)),
                FilterMode::Any => self.includes.iter().any(|r| r.matches(&doc)),
            };
            if !included {
                debug!("record failed include rules");
                return Ok(false);
            }
        }

        if !self.excludes.is_empty() {
            let excluded = match self.exclude_mode {
                FilterMode::All => self.excludes.iter().all(|r| r.matches(&doc)),
                FilterMode::Any => self.excludes.iter().any(|r| r.matches(&doc)),
            };
            if excluded {
                debug!("record matched exclude rules");
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Walk a dotted path into a JSON document
///
/// Segments index objects by key; a segment of decimal digits also indexes
/// arrays by position.
fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Render a scalar JSON value to matchable text
fn render(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

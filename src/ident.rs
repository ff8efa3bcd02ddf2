//! Identifier parsing and relative-path derivation
//!
//! An identifier names one logical record. The canonical form is a decimal
//! id, optionally followed by `-alt-<label>` to select an alternate view of
//! the same record:
//!
//! ```text
//! 102527513
//! 102527513-alt-quattroshapes
//! ```
//!
//! The relative path for an id splits its decimal digits into 3-digit
//! chunks from the left, so `102527513` lives at
//! `102/527/513/102527513.json`. Parsing is pure: a malformed identifier
//! fails here and never produces a path.

use regex::Regex;
use std::sync::LazyLock;

/// Extension for record files
const RECORD_EXT: &str = "json";

/// Regex for the identifier grammar
static IDENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)(?:-alt-([A-Za-z0-9_.\-]+))?$").expect("Invalid identifier regex")
});

/// A successfully parsed identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedIdent {
    /// Numeric record id
    pub id: u64,

    /// Alternate-view label, if the identifier carried one
    pub alternate: Option<String>,
}

impl ParsedIdent {
    /// Derive the backend-relative path for this identifier
    ///
    /// Fails if the alternate label would escape the record tree.
    pub fn rel_path(&self) -> Result<String, String> {
        if let Some(label) = &self.alternate {
            // The grammar admits dots, so "." and ".." need rejecting here.
            if label == "." || label == ".." {
                return Err(format!("alternate label '{}' is not a valid path segment", label));
            }
        }

        let digits = self.id.to_string();
        let mut parts: Vec<&str> = digits
            .as_bytes()
            .chunks(3)
            .map(|c| std::str::from_utf8(c).expect("decimal digits are ASCII"))
            .collect();

        let fname = match &self.alternate {
            Some(label) => format!("{}-alt-{}.{}", digits, label, RECORD_EXT),
            None => format!("{}.{}", digits, RECORD_EXT),
        };

        let fname_ref = fname.as_str();
        parts.push(fname_ref);
        Ok(parts.join("/"))
    }
}

/// Parse an identifier string
///
/// Returns the numeric id and optional alternate label, or a reason string
/// when the identifier does not match the grammar.
pub fn parse_identifier(identifier: &str) -> Result<ParsedIdent, String> {
    let caps = IDENT_REGEX
        .captures(identifier)
        .ok_or_else(|| "expected '<id>' or '<id>-alt-<label>'".to_string())?;

    let id: u64 = caps[1]
        .parse()
        .map_err(|_| format!("id '{}' exceeds the supported range", &caps[1]))?;

    let alternate = caps.get(2).map(|m| m.as_str().to_string());

    Ok(ParsedIdent { id, alternate })
}

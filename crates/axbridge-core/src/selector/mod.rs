//! Selector grammars for querying a [`UiTree`](crate::UiTree).
//!
//! [`FastSelector`] resolves directly to node handles. [`LegacySelector`] is
//! replayed against the live tree on every use and carries the structural
//! predicates (index, instance, class regex, child/parent chaining) of the
//! older query layer.

mod fast;
mod legacy;
mod parse;

use std::fmt;

use regex::Regex;
use thiserror::Error;

pub use fast::FastSelector;
pub use legacy::LegacySelector;
pub use parse::parse_legacy;

/// Deepest `childSelector`/`fromParent` nesting a legacy selector may carry.
pub const MAX_SELECTOR_DEPTH: usize = 32;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectorError {
    #[error("Invalid regex '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },
    #[error("Selector '{selector}' is bound to a single instance and cannot be re-indexed")]
    SelectorCorruption { selector: String },
    #[error("Cannot parse selector at position {position}: {message}")]
    Parse { position: usize, message: String },
    #[error("Selector nesting exceeds {limit} levels")]
    TooDeep { limit: usize },
}

/// A regular expression that must match the whole value.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, SelectorError> {
        let regex =
            Regex::new(&format!("^(?:{source})$")).map_err(|e| SelectorError::InvalidRegex {
                pattern: source.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextMatch {
    Exact(String),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    Pattern(Pattern),
}

impl TextMatch {
    /// Absent values are matched as the empty string.
    pub fn matches(&self, value: Option<&str>) -> bool {
        let value = value.unwrap_or("");
        match self {
            TextMatch::Exact(expected) => value == expected,
            TextMatch::Contains(part) => value.contains(part.as_str()),
            TextMatch::StartsWith(prefix) => value.starts_with(prefix.as_str()),
            TextMatch::EndsWith(suffix) => value.ends_with(suffix.as_str()),
            TextMatch::Pattern(pattern) => pattern.is_match(value),
        }
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextMatch::Exact(v) => write!(f, "'{v}'"),
            TextMatch::Contains(v) => write!(f, "contains '{v}'"),
            TextMatch::StartsWith(v) => write!(f, "starts with '{v}'"),
            TextMatch::EndsWith(v) => write!(f, "ends with '{v}'"),
            TextMatch::Pattern(p) => write!(f, "~'{p}'"),
        }
    }
}

/// Either grammar, as received from a client.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    Fast(FastSelector),
    Legacy(LegacySelector),
}

impl Selector {
    pub fn is_legacy(&self) -> bool {
        matches!(self, Selector::Legacy(_))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Fast(s) => s.fmt(f),
            Selector::Legacy(s) => s.fmt(f),
        }
    }
}

//! Extension traits for decoding request payload fields.
//!
//! Clients are inconsistent about sending numbers and booleans as JSON
//! literals or as strings, so the lenient accessors accept both.

use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Missing '{0}' field")]
    Missing(String),
    #[error("Field '{field}' must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },
}

pub trait ValueExt {
    /// Get a string field or return default.
    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str;

    /// Get a required string field.
    fn require_str(&self, key: &str) -> Result<&str, PayloadError>;

    /// Get an optional non-negative integer, accepting `123` or `"123"`.
    fn lenient_u64(&self, key: &str) -> Result<Option<u64>, PayloadError>;

    /// Get an optional bool, accepting `true` or `"true"`.
    fn lenient_bool(&self, key: &str) -> Result<Option<bool>, PayloadError>;
}

impl ValueExt for Value {
    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(|v| v.as_str()).unwrap_or(default)
    }

    fn require_str(&self, key: &str) -> Result<&str, PayloadError> {
        match self.get(key) {
            None | Some(Value::Null) => Err(PayloadError::Missing(key.to_string())),
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(_) => Err(PayloadError::WrongType {
                field: key.to_string(),
                expected: "a string",
            }),
        }
    }

    fn lenient_u64(&self, key: &str) -> Result<Option<u64>, PayloadError> {
        let wrong = || PayloadError::WrongType {
            field: key.to_string(),
            expected: "a non-negative integer",
        };
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n.as_u64().map(Some).ok_or_else(wrong),
            Some(Value::String(s)) => s.trim().parse::<u64>().map(Some).map_err(|_| wrong()),
            Some(_) => Err(wrong()),
        }
    }

    fn lenient_bool(&self, key: &str) -> Result<Option<bool>, PayloadError> {
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => Ok(Some(s.eq_ignore_ascii_case("true"))),
            Some(_) => Err(PayloadError::WrongType {
                field: key.to_string(),
                expected: "a boolean",
            }),
        }
    }
}

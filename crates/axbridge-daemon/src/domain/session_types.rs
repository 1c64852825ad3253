//! Session value types.
//!
//! Domain types stay free of serialization and id-generation crates; the
//! adapters convert them at the boundary.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdError {
    pub message: String,
}

impl fmt::Display for SessionIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SessionIdError {}

/// Identifier of an automation session. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Validate an id received from a client.
    pub fn try_new(id: impl Into<String>) -> Result<Self, SessionIdError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(SessionIdError {
                message: "Session ID cannot be empty or whitespace-only".to_string(),
            });
        }
        Ok(Self(id))
    }

    /// Wrap an id that is known to be valid, e.g. a generated one.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub created_at: String,
    pub known_elements: usize,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_rejects_blank() {
        assert!(SessionId::try_new("").is_err());
        assert!(SessionId::try_new("   ").is_err());
        assert_eq!(SessionId::try_new("abc").unwrap().as_str(), "abc");
    }

    #[test]
    fn test_session_id_display() {
        let id = SessionId::new("s-1");
        assert_eq!(id.to_string(), "s-1");
        assert_eq!(id.as_ref(), "s-1");
    }
}

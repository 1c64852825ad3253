//! Domain errors for bridge operations.
//!
//! Every error maps to a JSON-RPC error code and carries structured context
//! so clients can react programmatically.

use axbridge_core::{GeometryError, SelectorError};
use axbridge_ipc::error_codes::{self, ErrorCategory};
use serde_json::{Value, json};
use thiserror::Error;

use crate::settings::SettingsError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    #[error("Element not found: {target}")]
    ElementNotFound { target: String },
    #[error("Element {element_id} is no longer attached to the UI tree")]
    StaleElement { element_id: String },
    #[error("Session not found: {0}")]
    SessionNotFound(String),
    #[error("No active session")]
    NoActiveSession,
    #[error("Attribute '{name}' is not supported")]
    UnsupportedAttribute { name: String },
    #[error("Invalid element state: {message}")]
    InvalidState { message: String },
    #[error("Setting '{name}' expects {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Automation bridge unavailable: {reason}")]
    BridgeUnavailable { reason: String },
    #[error("Selector '{selector}' is bound to a single instance and cannot be re-indexed")]
    SelectorCorruption { selector: String },
    #[error("Gave up enumerating '{selector}' after {limit} matches")]
    ResourceExhausted { selector: String, limit: usize },
    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),
    #[error("Session limit reached: maximum {max} sessions allowed")]
    SessionLimitReached { max: usize },
    #[error("Timed out acquiring lock for session {session_id}")]
    LockTimeout { session_id: String },
}

impl BridgeError {
    pub fn code(&self) -> i32 {
        match self {
            BridgeError::ElementNotFound { .. } => error_codes::ELEMENT_NOT_FOUND,
            BridgeError::StaleElement { .. } => error_codes::STALE_ELEMENT,
            BridgeError::SessionNotFound(_) => error_codes::SESSION_NOT_FOUND,
            BridgeError::NoActiveSession => error_codes::NO_ACTIVE_SESSION,
            BridgeError::UnsupportedAttribute { .. } => error_codes::UNSUPPORTED_ATTRIBUTE,
            BridgeError::InvalidState { .. } => error_codes::INVALID_STATE,
            BridgeError::TypeMismatch { .. } => error_codes::TYPE_MISMATCH,
            BridgeError::InvalidArgument(_) => error_codes::INVALID_ARGUMENT,
            BridgeError::BridgeUnavailable { .. } => error_codes::BRIDGE_UNAVAILABLE,
            BridgeError::SelectorCorruption { .. } => error_codes::SELECTOR_CORRUPTION,
            BridgeError::ResourceExhausted { .. } => error_codes::RESOURCE_EXHAUSTED,
            BridgeError::InvalidCoordinates(_) => error_codes::INVALID_COORDINATES,
            BridgeError::SessionLimitReached { .. } => error_codes::SESSION_LIMIT,
            BridgeError::LockTimeout { .. } => error_codes::LOCK_TIMEOUT,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        error_codes::category_for_code(self.code())
    }

    /// Short stable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::ElementNotFound { .. } => "ElementNotFound",
            BridgeError::StaleElement { .. } => "StaleElement",
            BridgeError::SessionNotFound(_) => "SessionNotFound",
            BridgeError::NoActiveSession => "NoActiveSession",
            BridgeError::UnsupportedAttribute { .. } => "UnsupportedAttribute",
            BridgeError::InvalidState { .. } => "InvalidState",
            BridgeError::TypeMismatch { .. } => "TypeMismatch",
            BridgeError::InvalidArgument(_) => "InvalidArgument",
            BridgeError::BridgeUnavailable { .. } => "BridgeUnavailable",
            BridgeError::SelectorCorruption { .. } => "SelectorCorruption",
            BridgeError::ResourceExhausted { .. } => "ResourceExhausted",
            BridgeError::InvalidCoordinates(_) => "InvalidCoordinates",
            BridgeError::SessionLimitReached { .. } => "SessionLimitReached",
            BridgeError::LockTimeout { .. } => "LockTimeout",
        }
    }

    pub fn context(&self) -> Value {
        let mut ctx = match self {
            BridgeError::ElementNotFound { target } => json!({ "target": target }),
            BridgeError::StaleElement { element_id } => json!({ "element_id": element_id }),
            BridgeError::SessionNotFound(id) => json!({ "session_id": id }),
            BridgeError::NoActiveSession => json!({}),
            BridgeError::UnsupportedAttribute { name } => json!({ "attribute": name }),
            BridgeError::InvalidState { message } => json!({ "message": message }),
            BridgeError::TypeMismatch {
                name,
                expected,
                actual,
            } => json!({ "setting": name, "expected": expected, "actual": actual }),
            BridgeError::InvalidArgument(reason) => json!({ "reason": reason }),
            BridgeError::BridgeUnavailable { reason } => json!({ "reason": reason }),
            BridgeError::SelectorCorruption { selector } => json!({ "selector": selector }),
            BridgeError::ResourceExhausted { selector, limit } => {
                json!({ "selector": selector, "limit": limit })
            }
            BridgeError::InvalidCoordinates(reason) => json!({ "reason": reason }),
            BridgeError::SessionLimitReached { max } => json!({ "max_sessions": max }),
            BridgeError::LockTimeout { session_id } => json!({ "session_id": session_id }),
        };
        ctx["kind"] = json!(self.kind());
        ctx
    }

    pub fn suggestion(&self) -> String {
        match self {
            BridgeError::ElementNotFound { .. } => {
                "Check the selector against a fresh 'source' dump; the screen may not have loaded yet."
                    .to_string()
            }
            BridgeError::StaleElement { .. } => {
                "The element left the screen. Find it again to get a fresh element id.".to_string()
            }
            BridgeError::SessionNotFound(_) | BridgeError::NoActiveSession => {
                "Run 'createSession' first.".to_string()
            }
            BridgeError::UnsupportedAttribute { .. } => {
                "Supported attributes: text, content-desc, class, resource-id, bounds, enabled, checkable, checked, clickable, focusable, focused, long-clickable, scrollable, selected, displayed, password, selection-start, selection-end, package, content-size.".to_string()
            }
            BridgeError::InvalidState { .. } => {
                "The app rejected the action. Make sure the element is enabled and editable."
                    .to_string()
            }
            BridgeError::TypeMismatch { expected, .. } => {
                format!("Send the value as a JSON {expected}.")
            }
            BridgeError::InvalidArgument(_) => "Check the request parameters.".to_string(),
            BridgeError::BridgeUnavailable { .. } => {
                "The automation session is not connected. Restart the instrumentation and retry."
                    .to_string()
            }
            BridgeError::SelectorCorruption { .. } => {
                "Drop the instance() clause to enumerate all matches, or use findElement for the bound instance.".to_string()
            }
            BridgeError::ResourceExhausted { limit, .. } => {
                format!(
                    "More than {limit} matches. Narrow the selector or raise AXBRIDGE_FIND_ALL_LIMIT."
                )
            }
            BridgeError::InvalidCoordinates(_) => {
                "Use absolute pixels inside the screen, or fractions in (0, 1).".to_string()
            }
            BridgeError::SessionLimitReached { .. } => {
                "Delete an existing session or raise AXBRIDGE_MAX_SESSIONS.".to_string()
            }
            BridgeError::LockTimeout { .. } => {
                "Session is busy with another command. Try again in a moment.".to_string()
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        error_codes::is_retryable(self.code())
    }
}

impl From<SettingsError> for BridgeError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::TypeMismatch {
                name,
                expected,
                actual,
            } => BridgeError::TypeMismatch {
                name,
                expected: expected.to_string(),
                actual: actual.to_string(),
            },
            other => BridgeError::InvalidArgument(other.to_string()),
        }
    }
}

impl From<SelectorError> for BridgeError {
    fn from(err: SelectorError) -> Self {
        match err {
            SelectorError::SelectorCorruption { selector } => {
                BridgeError::SelectorCorruption { selector }
            }
            other => BridgeError::InvalidArgument(other.to_string()),
        }
    }
}

impl From<GeometryError> for BridgeError {
    fn from(err: GeometryError) -> Self {
        BridgeError::InvalidCoordinates(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_flavours_share_category() {
        let missing = BridgeError::ElementNotFound {
            target: "UiSelector[TEXT=OK]".into(),
        };
        let stale = BridgeError::StaleElement {
            element_id: "abc".into(),
        };
        assert_eq!(missing.category(), ErrorCategory::NotFound);
        assert_eq!(stale.category(), ErrorCategory::NotFound);
        assert_ne!(missing.code(), stale.code());
    }

    #[test]
    fn test_settings_type_mismatch_converts() {
        let err: BridgeError = SettingsError::TypeMismatch {
            name: "waitForIdleTimeout".into(),
            expected: "integer",
            actual: "string",
        }
        .into();
        assert_eq!(err.code(), error_codes::TYPE_MISMATCH);
        assert_eq!(err.context()["setting"], "waitForIdleTimeout");
        assert_eq!(err.context()["kind"], "TypeMismatch");
    }

    #[test]
    fn test_selector_corruption_converts() {
        let err: BridgeError = SelectorError::SelectorCorruption {
            selector: "UiSelector[INSTANCE=0]".into(),
        }
        .into();
        assert_eq!(err.code(), error_codes::SELECTOR_CORRUPTION);
        assert_eq!(err.category(), ErrorCategory::InvalidInput);
    }

    #[test]
    fn test_geometry_error_converts() {
        let err: BridgeError = GeometryError::NegativeCoordinate { coordinate: -1.0 }.into();
        assert_eq!(err.code(), error_codes::INVALID_COORDINATES);
    }

    #[test]
    fn test_resource_exhausted_context() {
        let err = BridgeError::ResourceExhausted {
            selector: "UiSelector[CLASS=x]".into(),
            limit: 10,
        };
        assert_eq!(err.context()["limit"], 10);
        assert_eq!(err.category(), ErrorCategory::Busy);
        assert!(err.suggestion().contains("10"));
    }

    #[test]
    fn test_bridge_unavailable_is_retryable() {
        let err = BridgeError::BridgeUnavailable {
            reason: "disconnected".into(),
        };
        assert!(err.is_retryable());
        assert!(!BridgeError::NoActiveSession.is_retryable());
    }
}

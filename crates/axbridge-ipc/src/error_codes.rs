//! Semantic error codes for JSON-RPC domain errors.
//!
//! Codes follow the JSON-RPC 2.0 layout:
//! - -32700 to -32600: reserved protocol errors
//! - -32000 to -32099: server errors (-32001 to -32020 are domain errors)

// Protocol errors
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

// Session errors
pub const SESSION_NOT_FOUND: i32 = -32001;
pub const NO_ACTIVE_SESSION: i32 = -32002;
pub const SESSION_LIMIT: i32 = -32006;
pub const LOCK_TIMEOUT: i32 = -32007;

// Element errors
pub const ELEMENT_NOT_FOUND: i32 = -32003;
pub const STALE_ELEMENT: i32 = -32004;
pub const UNSUPPORTED_ATTRIBUTE: i32 = -32005;
pub const INVALID_STATE: i32 = -32008;

// Input errors
pub const TYPE_MISMATCH: i32 = -32009;
pub const INVALID_ARGUMENT: i32 = -32010;
pub const SELECTOR_CORRUPTION: i32 = -32011;
pub const INVALID_COORDINATES: i32 = -32012;

// Platform errors
pub const BRIDGE_UNAVAILABLE: i32 = -32014;
pub const RESOURCE_EXHAUSTED: i32 = -32015;

pub const GENERIC_ERROR: i32 = -32000;

/// Error category for programmatic handling by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Session or element does not exist
    NotFound,
    InvalidInput,
    /// Resource busy, locked or exhausted
    Busy,
    Internal,
    /// The automation platform or the app under test refused
    External,
    Timeout,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::Busy => "busy",
            ErrorCategory::Internal => "internal",
            ErrorCategory::External => "external",
            ErrorCategory::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transient conditions that may succeed on retry.
pub fn is_retryable(code: i32) -> bool {
    matches!(code, LOCK_TIMEOUT | BRIDGE_UNAVAILABLE | GENERIC_ERROR)
}

pub fn category_for_code(code: i32) -> ErrorCategory {
    match code {
        SESSION_NOT_FOUND | NO_ACTIVE_SESSION | ELEMENT_NOT_FOUND | STALE_ELEMENT => {
            ErrorCategory::NotFound
        }
        UNSUPPORTED_ATTRIBUTE | TYPE_MISMATCH | INVALID_ARGUMENT | SELECTOR_CORRUPTION
        | INVALID_COORDINATES | INVALID_PARAMS | METHOD_NOT_FOUND => ErrorCategory::InvalidInput,
        SESSION_LIMIT | LOCK_TIMEOUT | RESOURCE_EXHAUSTED => ErrorCategory::Busy,
        INVALID_STATE | BRIDGE_UNAVAILABLE => ErrorCategory::External,
        _ => ErrorCategory::Internal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(is_retryable(LOCK_TIMEOUT));
        assert!(is_retryable(BRIDGE_UNAVAILABLE));
        assert!(!is_retryable(ELEMENT_NOT_FOUND));
        assert!(!is_retryable(SELECTOR_CORRUPTION));
    }

    #[test]
    fn test_category_for_code_not_found() {
        for code in [SESSION_NOT_FOUND, NO_ACTIVE_SESSION, ELEMENT_NOT_FOUND, STALE_ELEMENT] {
            assert_eq!(category_for_code(code), ErrorCategory::NotFound);
        }
    }

    #[test]
    fn test_category_for_code_invalid_input() {
        for code in [
            UNSUPPORTED_ATTRIBUTE,
            TYPE_MISMATCH,
            INVALID_ARGUMENT,
            SELECTOR_CORRUPTION,
            INVALID_COORDINATES,
            INVALID_PARAMS,
        ] {
            assert_eq!(category_for_code(code), ErrorCategory::InvalidInput);
        }
    }

    #[test]
    fn test_category_for_code_busy_and_external() {
        assert_eq!(category_for_code(SESSION_LIMIT), ErrorCategory::Busy);
        assert_eq!(category_for_code(RESOURCE_EXHAUSTED), ErrorCategory::Busy);
        assert_eq!(category_for_code(INVALID_STATE), ErrorCategory::External);
        assert_eq!(category_for_code(BRIDGE_UNAVAILABLE), ErrorCategory::External);
        assert_eq!(category_for_code(GENERIC_ERROR), ErrorCategory::Internal);
    }
}

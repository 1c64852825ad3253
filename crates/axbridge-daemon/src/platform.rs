//! The automation session as the device exposes it.

use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;
use std::time::Duration;

use axbridge_core::{Gesture, Size, UiTree};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    #[error("automation session is not connected")]
    Disconnected,
    #[error("platform rejected {operation}: {reason}")]
    Rejected { operation: String, reason: String },
}

/// Accessibility service flags applied to the automation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ServiceFlags(u32);

impl ServiceFlags {
    pub const NONE: ServiceFlags = ServiceFlags(0);
    pub const DONT_SUPPRESS_ACCESSIBILITY_SERVICES: ServiceFlags = ServiceFlags(1);
    pub const REPORT_VIEW_IDS: ServiceFlags = ServiceFlags(1 << 1);
    pub const RETRIEVE_INTERACTIVE_WINDOWS: ServiceFlags = ServiceFlags(1 << 2);

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn contains(&self, other: ServiceFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn without(self, other: ServiceFlags) -> ServiceFlags {
        ServiceFlags(self.0 & !other.0)
    }
}

impl BitOr for ServiceFlags {
    type Output = ServiceFlags;

    fn bitor(self, rhs: ServiceFlags) -> ServiceFlags {
        ServiceFlags(self.0 | rhs.0)
    }
}

impl fmt::Display for ServiceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [
            (Self::DONT_SUPPRESS_ACCESSIBILITY_SERVICES, "DONT_SUPPRESS_ACCESSIBILITY_SERVICES"),
            (Self::REPORT_VIEW_IDS, "REPORT_VIEW_IDS"),
            (Self::RETRIEVE_INTERACTIVE_WINDOWS, "RETRIEVE_INTERACTIVE_WINDOWS"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect();
        if names.is_empty() {
            return f.write_str("NONE");
        }
        f.write_str(&names.join("|"))
    }
}

/// Device-side automation session.
///
/// Everything the bridge needs from the device goes through this trait; the
/// tree itself is live and mutated by the app under test.
pub trait AutomationPlatform: Send + Sync {
    fn is_connected(&self) -> bool;

    fn tree(&self) -> Arc<dyn UiTree>;

    fn service_flags(&self) -> ServiceFlags;

    fn set_service_flags(&self, flags: ServiceFlags) -> Result<(), PlatformError>;

    fn set_default_idle_timeout(&self, timeout: Duration) -> Result<(), PlatformError>;

    /// Display size excluding system decorations.
    fn display_size(&self) -> Size;

    /// Physical display size including decorations.
    fn real_display_size(&self) -> Size;

    /// Returns false when the platform could not inject the gesture.
    fn perform_gesture(&self, gesture: &Gesture) -> bool;

    fn press_enter(&self) -> bool;
}

use std::collections::BTreeMap;
use std::time::Duration;

use axbridge_core::{Rect, Selector};
use serde_json::{Map, Value};

use super::session_types::SessionId;
use super::session_types::SessionInfo;

#[derive(Debug, Clone, Default)]
pub struct StatusOutput {
    pub ready: bool,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct CreateSessionInput {
    pub session_id: Option<String>,
    pub capabilities: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct CreateSessionOutput {
    pub session_id: SessionId,
    /// Capabilities that were applied to the settings registry.
    pub applied_settings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DeleteSessionInput {
    pub session_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeleteSessionOutput {
    pub session_id: String,
    pub released_elements: usize,
}

#[derive(Debug, Clone)]
pub struct SessionsOutput {
    pub sessions: Vec<SessionInfo>,
    pub active_session: Option<SessionId>,
}

#[derive(Debug, Clone, Default)]
pub struct WaitForIdleInput {
    pub idle_timeout: Option<Duration>,
    pub global_timeout: Option<Duration>,
}

#[derive(Debug, Clone, Copy)]
pub struct WaitForIdleOutput {
    pub elapsed_ms: u64,
    pub settled: bool,
}

#[derive(Debug, Clone)]
pub struct FindElementInput {
    pub session_id: Option<String>,
    pub selector: Selector,
    /// Element id of the scope; searches the whole screen when absent.
    pub context_id: Option<String>,
    pub multiple: bool,
}

/// What a client learns about a freshly published element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSummary {
    pub element_id: String,
    pub class_name: String,
    pub text: Option<String>,
    pub bounds: Rect,
}

#[derive(Debug, Clone)]
pub struct FindElementOutput {
    pub elements: Vec<ElementSummary>,
}

#[derive(Debug, Clone)]
pub struct GetAttributeInput {
    pub session_id: Option<String>,
    pub element_id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct GetAttributeOutput {
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClickInput {
    pub session_id: Option<String>,
    pub element_id: String,
}

#[derive(Debug, Clone)]
pub struct SendKeysInput {
    pub session_id: Option<String>,
    /// Target element; the focused element when absent.
    pub element_id: Option<String>,
    pub text: String,
    pub replace: bool,
}

#[derive(Debug, Clone)]
pub struct SendKeysOutput {
    pub pressed_enter: bool,
}

#[derive(Debug, Clone)]
pub struct ReleaseElementInput {
    pub session_id: Option<String>,
    pub element_id: String,
}

#[derive(Debug, Clone)]
pub struct SettingsOutput {
    pub settings: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct UpdateSettingsInput {
    pub settings: Map<String, Value>,
}

#[derive(Debug, Clone, Default)]
pub struct SourceInput {
    pub session_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SourceOutput {
    pub hierarchy: Value,
    pub node_count: usize,
    pub truncated: bool,
}

use std::sync::Arc;
use std::sync::Mutex;

use serde_json::{Map, Value};

use crate::error::BridgeError;
use crate::session::{Session, SessionId, SessionInfo, SessionManager};

/// Session storage as seen by the use cases.
pub trait SessionRepository: Send + Sync {
    /// Create a session and make it the active one.
    fn create(
        &self,
        session_id: Option<String>,
        capabilities: Map<String, Value>,
    ) -> Result<SessionId, BridgeError>;

    fn get(&self, session_id: &str) -> Result<Arc<Mutex<Session>>, BridgeError>;

    fn active(&self) -> Result<Arc<Mutex<Session>>, BridgeError>;

    /// Resolve a session by id, falling back to the active session if None.
    fn resolve(&self, session_id: Option<&str>) -> Result<Arc<Mutex<Session>>, BridgeError>;

    /// Delete a session; returns how many published elements were dropped.
    fn delete(&self, session_id: &str) -> Result<usize, BridgeError>;

    fn list(&self) -> Vec<SessionInfo>;

    fn session_count(&self) -> usize;

    fn active_session_id(&self) -> Option<SessionId>;
}

impl SessionRepository for SessionManager {
    fn create(
        &self,
        session_id: Option<String>,
        capabilities: Map<String, Value>,
    ) -> Result<SessionId, BridgeError> {
        SessionManager::create(self, session_id, capabilities)
    }

    fn get(&self, session_id: &str) -> Result<Arc<Mutex<Session>>, BridgeError> {
        SessionManager::get(self, session_id)
    }

    fn active(&self) -> Result<Arc<Mutex<Session>>, BridgeError> {
        SessionManager::active(self)
    }

    fn resolve(&self, session_id: Option<&str>) -> Result<Arc<Mutex<Session>>, BridgeError> {
        SessionManager::resolve(self, session_id)
    }

    fn delete(&self, session_id: &str) -> Result<usize, BridgeError> {
        SessionManager::delete(self, session_id)
    }

    fn list(&self) -> Vec<SessionInfo> {
        SessionManager::list(self)
    }

    fn session_count(&self) -> usize {
        SessionManager::session_count(self)
    }

    fn active_session_id(&self) -> Option<SessionId> {
        SessionManager::active_session_id(self)
    }
}

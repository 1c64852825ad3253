//! Configurable `SessionRepository` for use case tests.
//!
//! Serves one in-memory session (when configured) or canned errors, and
//! records calls for verification.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axbridge_common::mutex_lock_or_recover;
use serde_json::{Map, Value};

use crate::error::BridgeError;
use crate::repository::SessionRepository;
use crate::session::{Session, SessionId, SessionInfo};

#[derive(Default)]
pub struct MockSessionRepository {
    session: Option<Arc<Mutex<Session>>>,
    resolve_error: Option<BridgeError>,
    create_error: Option<BridgeError>,
    delete_error: Option<BridgeError>,
    resolve_calls: AtomicUsize,
    created: Mutex<Vec<Map<String, Value>>>,
    deleted: Mutex<Vec<String>>,
}

impl MockSessionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MockSessionRepositoryBuilder {
        MockSessionRepositoryBuilder::new()
    }

    pub fn resolve_call_count(&self) -> usize {
        self.resolve_calls.load(Ordering::SeqCst)
    }

    /// Capabilities passed to each `create` call.
    pub fn created_capabilities(&self) -> Vec<Map<String, Value>> {
        mutex_lock_or_recover(&self.created).clone()
    }

    pub fn deleted_sessions(&self) -> Vec<String> {
        mutex_lock_or_recover(&self.deleted).clone()
    }

    pub fn session(&self) -> Option<Arc<Mutex<Session>>> {
        self.session.clone()
    }
}

impl SessionRepository for MockSessionRepository {
    fn create(
        &self,
        session_id: Option<String>,
        capabilities: Map<String, Value>,
    ) -> Result<SessionId, BridgeError> {
        mutex_lock_or_recover(&self.created).push(capabilities);
        if let Some(err) = &self.create_error {
            return Err(err.clone());
        }
        Ok(SessionId::new(session_id.unwrap_or_else(|| "mock-session".to_string())))
    }

    fn get(&self, session_id: &str) -> Result<Arc<Mutex<Session>>, BridgeError> {
        match &self.session {
            Some(session) if mutex_lock_or_recover(session).id.as_str() == session_id => {
                Ok(Arc::clone(session))
            }
            _ => Err(BridgeError::SessionNotFound(session_id.to_string())),
        }
    }

    fn active(&self) -> Result<Arc<Mutex<Session>>, BridgeError> {
        self.session.clone().ok_or(BridgeError::NoActiveSession)
    }

    fn resolve(&self, session_id: Option<&str>) -> Result<Arc<Mutex<Session>>, BridgeError> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.resolve_error {
            return Err(err.clone());
        }
        match session_id {
            Some(id) => self.get(id),
            None => self.active(),
        }
    }

    fn delete(&self, session_id: &str) -> Result<usize, BridgeError> {
        mutex_lock_or_recover(&self.deleted).push(session_id.to_string());
        if let Some(err) = &self.delete_error {
            return Err(err.clone());
        }
        Ok(0)
    }

    fn list(&self) -> Vec<SessionInfo> {
        Vec::new()
    }

    fn session_count(&self) -> usize {
        usize::from(self.session.is_some())
    }

    fn active_session_id(&self) -> Option<SessionId> {
        self.session
            .as_ref()
            .map(|s| mutex_lock_or_recover(s).id.clone())
    }
}

#[derive(Default)]
pub struct MockSessionRepositoryBuilder {
    repo: MockSessionRepository,
}

impl MockSessionRepositoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve an empty session with this id.
    pub fn with_session(mut self, session_id: &str) -> Self {
        self.repo.session = Some(Arc::new(Mutex::new(Session::new(
            SessionId::new(session_id),
            Map::new(),
        ))));
        self
    }

    pub fn with_resolve_error(mut self, error: BridgeError) -> Self {
        self.repo.resolve_error = Some(error);
        self
    }

    pub fn with_create_error(mut self, error: BridgeError) -> Self {
        self.repo.create_error = Some(error);
        self
    }

    pub fn with_delete_error(mut self, error: BridgeError) -> Self {
        self.repo.delete_error = Some(error);
        self
    }

    pub fn build(self) -> MockSessionRepository {
        self.repo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_without_session() {
        let repo = MockSessionRepository::new();
        assert!(matches!(repo.resolve(None), Err(BridgeError::NoActiveSession)));
        assert_eq!(repo.resolve_call_count(), 1);
        assert_eq!(repo.session_count(), 0);
    }

    #[test]
    fn test_mock_repository_serves_configured_session() {
        let repo = MockSessionRepository::builder().with_session("s1").build();
        assert!(repo.resolve(Some("s1")).is_ok());
        assert!(matches!(
            repo.resolve(Some("s2")),
            Err(BridgeError::SessionNotFound(_))
        ));
        assert_eq!(repo.active_session_id().unwrap().as_str(), "s1");
    }

    #[test]
    fn test_mock_repository_configured_error_wins() {
        let repo = MockSessionRepository::builder()
            .with_session("s1")
            .with_resolve_error(BridgeError::LockTimeout {
                session_id: "s1".into(),
            })
            .build();
        assert!(matches!(
            repo.resolve(None),
            Err(BridgeError::LockTimeout { .. })
        ));
    }

    #[test]
    fn test_mock_repository_records_lifecycle_calls() {
        let repo = MockSessionRepository::new();
        let mut caps = Map::new();
        caps.insert("waitForIdleTimeout".into(), Value::from(10));
        repo.create(None, caps.clone()).unwrap();
        repo.delete("x").unwrap();
        assert_eq!(repo.created_capabilities(), vec![caps]);
        assert_eq!(repo.deleted_sessions(), vec!["x"]);
    }
}

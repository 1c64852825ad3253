use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::RwLock;
use std::time::Duration;

use axbridge_common::mutex_try_lock_for;
use axbridge_common::rwlock_read_or_recover;
use axbridge_common::rwlock_write_or_recover;
use chrono::DateTime;
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::element::ElementHandle;
use crate::error::BridgeError;

pub use crate::domain::session_types::SessionId;
pub use crate::domain::session_types::SessionInfo;

pub const DEFAULT_MAX_SESSIONS: usize = 1;

/// How long a command waits for a busy session before giving up.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Generate a new unique session id.
pub fn generate_session_id() -> SessionId {
    SessionId::new(Uuid::new_v4().to_string())
}

/// Elements published to a client, keyed by id.
///
/// This is the only place element ids are minted and the only place handles
/// are dropped.
#[derive(Debug, Default)]
pub struct KnownElements {
    elements: HashMap<String, Arc<ElementHandle>>,
}

impl KnownElements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `handle` under a fresh id, or return the id already held by
    /// a handle with the same target so repeated lookups do not grow the map.
    pub fn put(&mut self, mut handle: ElementHandle) -> String {
        if let Some(known) = self.elements.values().find(|known| known.same_target(&handle)) {
            return known.id().to_string();
        }
        let id = Uuid::new_v4().to_string();
        handle.assign_id(id.clone());
        self.elements.insert(id.clone(), Arc::new(handle));
        id
    }

    pub fn get(&self, id: &str) -> Result<Arc<ElementHandle>, BridgeError> {
        self.elements
            .get(id)
            .cloned()
            .ok_or_else(|| BridgeError::ElementNotFound {
                target: format!("element id {id}"),
            })
    }

    pub fn remove(&mut self, id: &str) -> Result<Arc<ElementHandle>, BridgeError> {
        self.elements
            .remove(id)
            .ok_or_else(|| BridgeError::ElementNotFound {
                target: format!("element id {id}"),
            })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) -> usize {
        let released = self.elements.len();
        self.elements.clear();
        released
    }
}

pub struct Session {
    pub id: SessionId,
    known_elements: KnownElements,
    capabilities: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, capabilities: Map<String, Value>) -> Self {
        Self {
            id,
            known_elements: KnownElements::new(),
            capabilities,
            created_at: Utc::now(),
        }
    }

    pub fn known_elements(&self) -> &KnownElements {
        &self.known_elements
    }

    pub fn known_elements_mut(&mut self) -> &mut KnownElements {
        &mut self.known_elements
    }

    pub fn capabilities(&self) -> &Map<String, Value> {
        &self.capabilities
    }

    pub fn element(&self, id: &str) -> Result<Arc<ElementHandle>, BridgeError> {
        self.known_elements.get(id)
    }
}

/// Take the session lock, giving up after `timeout`.
pub fn acquire_session<'a>(
    session: &'a Arc<Mutex<Session>>,
    session_id: Option<&str>,
    timeout: Duration,
) -> Result<MutexGuard<'a, Session>, BridgeError> {
    mutex_try_lock_for(session, timeout).ok_or_else(|| BridgeError::LockTimeout {
        session_id: session_id.unwrap_or("active").to_string(),
    })
}

/// Lock ordering: sessions → active_session → Session mutex
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
    active_session: RwLock<Option<SessionId>>,
    max_sessions: usize,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_max_sessions(DEFAULT_MAX_SESSIONS)
    }

    pub fn with_max_sessions(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            active_session: RwLock::new(None),
            max_sessions,
        }
    }

    pub fn create(
        &self,
        session_id: Option<String>,
        capabilities: Map<String, Value>,
    ) -> Result<SessionId, BridgeError> {
        let id = match session_id {
            Some(raw) => SessionId::try_new(raw)
                .map_err(|e| BridgeError::InvalidArgument(e.to_string()))?,
            None => generate_session_id(),
        };

        {
            let mut sessions = rwlock_write_or_recover(&self.sessions);
            if sessions.len() >= self.max_sessions {
                return Err(BridgeError::SessionLimitReached {
                    max: self.max_sessions,
                });
            }
            if sessions.contains_key(&id) {
                return Err(BridgeError::InvalidArgument(format!(
                    "session {id} already exists"
                )));
            }
            let session = Session::new(id.clone(), capabilities);
            sessions.insert(id.clone(), Arc::new(Mutex::new(session)));
        }

        *rwlock_write_or_recover(&self.active_session) = Some(id.clone());
        info!(session_id = %id, "Session created");
        Ok(id)
    }

    pub fn get(&self, session_id: &str) -> Result<Arc<Mutex<Session>>, BridgeError> {
        let sessions = rwlock_read_or_recover(&self.sessions);
        sessions
            .get(&SessionId::new(session_id))
            .cloned()
            .ok_or_else(|| BridgeError::SessionNotFound(session_id.to_string()))
    }

    pub fn active(&self) -> Result<Arc<Mutex<Session>>, BridgeError> {
        let active_id = rwlock_read_or_recover(&self.active_session).clone();
        match active_id {
            Some(id) => self.get(id.as_str()),
            None => Err(BridgeError::NoActiveSession),
        }
    }

    pub fn resolve(&self, session_id: Option<&str>) -> Result<Arc<Mutex<Session>>, BridgeError> {
        match session_id {
            Some(id) => self.get(id),
            None => self.active(),
        }
    }

    /// Remove a session and drop every element it published.
    pub fn delete(&self, session_id: &str) -> Result<usize, BridgeError> {
        let id = SessionId::new(session_id);
        let session = {
            let mut sessions = rwlock_write_or_recover(&self.sessions);
            let mut active = rwlock_write_or_recover(&self.active_session);
            let session = sessions
                .remove(&id)
                .ok_or_else(|| BridgeError::SessionNotFound(session_id.to_string()))?;
            if active.as_ref() == Some(&id) {
                *active = None;
            }
            session
        };
        let released = axbridge_common::mutex_lock_or_recover(&session)
            .known_elements_mut()
            .clear();
        debug!(session_id, released, "Session deleted");
        Ok(released)
    }

    pub fn list(&self) -> Vec<SessionInfo> {
        let active = self.active_session_id();
        let refs: Vec<(SessionId, Arc<Mutex<Session>>)> = rwlock_read_or_recover(&self.sessions)
            .iter()
            .map(|(id, s)| (id.clone(), Arc::clone(s)))
            .collect();
        refs.into_iter()
            .map(|(id, session)| {
                let (created_at, known_elements) =
                    match mutex_try_lock_for(&session, Duration::from_millis(100)) {
                        Some(s) => (s.created_at.to_rfc3339(), s.known_elements().len()),
                        None => (String::new(), 0),
                    };
                SessionInfo {
                    active: active.as_ref() == Some(&id),
                    id,
                    created_at,
                    known_elements,
                }
            })
            .collect()
    }

    pub fn session_count(&self) -> usize {
        rwlock_read_or_recover(&self.sessions).len()
    }

    pub fn active_session_id(&self) -> Option<SessionId> {
        rwlock_read_or_recover(&self.active_session).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, FastElement};
    use axbridge_core::{FastSelector, NodeId, Selector};
    use std::thread;

    fn handle() -> ElementHandle {
        handle_at(7)
    }

    fn handle_at(node: u64) -> ElementHandle {
        ElementHandle::new(
            ElementKind::Fast(FastElement::new(NodeId(node))),
            Selector::Fast(FastSelector::new()),
            true,
        )
    }

    #[test]
    fn test_known_elements_mint_unique_ids() {
        let mut known = KnownElements::new();
        let a = known.put(handle_at(7));
        let b = known.put(handle_at(8));
        assert_ne!(a, b);
        assert_eq!(known.len(), 2);
        assert_eq!(known.get(&a).unwrap().id(), a);
    }

    #[test]
    fn test_known_elements_reuse_id_for_same_target() {
        let mut known = KnownElements::new();
        let first = known.put(handle());
        for _ in 0..10 {
            assert_eq!(known.put(handle()), first);
        }
        assert_eq!(known.len(), 1);

        let scoped = known.put(handle().with_context(Some(first.clone())));
        assert_ne!(scoped, first);
        assert_eq!(known.len(), 2);

        known.remove(&first).unwrap();
        let fresh = known.put(handle());
        assert_ne!(fresh, first);
    }

    #[test]
    fn test_unknown_element_id_is_not_found() {
        let mut known = KnownElements::new();
        assert!(matches!(
            known.get("nope"),
            Err(BridgeError::ElementNotFound { .. })
        ));
        let id = known.put(handle());
        known.remove(&id).unwrap();
        assert!(known.get(&id).is_err());
        assert!(known.remove(&id).is_err());
    }

    #[test]
    fn test_create_respects_session_limit() {
        let manager = SessionManager::with_max_sessions(1);
        let id = manager.create(None, Map::new()).unwrap();
        assert_eq!(manager.active_session_id(), Some(id.clone()));
        assert!(matches!(
            manager.create(None, Map::new()),
            Err(BridgeError::SessionLimitReached { max: 1 })
        ));

        manager.delete(id.as_str()).unwrap();
        assert_eq!(manager.active_session_id(), None);
        assert!(manager.create(None, Map::new()).is_ok());
    }

    #[test]
    fn test_create_rejects_blank_or_duplicate_id() {
        let manager = SessionManager::with_max_sessions(4);
        assert!(matches!(
            manager.create(Some("  ".into()), Map::new()),
            Err(BridgeError::InvalidArgument(_))
        ));
        manager.create(Some("s1".into()), Map::new()).unwrap();
        assert!(manager.create(Some("s1".into()), Map::new()).is_err());
    }

    #[test]
    fn test_resolve_falls_back_to_active() {
        let manager = SessionManager::with_max_sessions(2);
        assert!(matches!(
            manager.resolve(None),
            Err(BridgeError::NoActiveSession)
        ));
        manager.create(Some("s1".into()), Map::new()).unwrap();
        let session = manager.resolve(None).unwrap();
        assert_eq!(session.lock().unwrap().id.as_str(), "s1");
        assert!(matches!(
            manager.resolve(Some("other")),
            Err(BridgeError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_delete_releases_elements() {
        let manager = SessionManager::with_max_sessions(1);
        let id = manager.create(None, Map::new()).unwrap();
        {
            let session = manager.get(id.as_str()).unwrap();
            let mut guard = session.lock().unwrap();
            guard.known_elements_mut().put(handle_at(7));
            guard.known_elements_mut().put(handle_at(8));
        }
        let info = manager.list();
        assert_eq!(info.len(), 1);
        assert_eq!(info[0].known_elements, 2);
        assert!(info[0].active);

        assert_eq!(manager.delete(id.as_str()).unwrap(), 2);
        assert!(matches!(
            manager.delete(id.as_str()),
            Err(BridgeError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_acquire_session_times_out() {
        let session = Arc::new(Mutex::new(Session::new(SessionId::new("s"), Map::new())));
        let held = Arc::clone(&session);
        let (locked_tx, locked_rx) = std::sync::mpsc::channel();
        let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
        let holder = thread::spawn(move || {
            let _guard = held.lock().unwrap();
            locked_tx.send(()).unwrap();
            release_rx.recv().unwrap();
        });
        locked_rx.recv().unwrap();

        assert!(matches!(
            acquire_session(&session, Some("s"), Duration::from_millis(20)),
            Err(BridgeError::LockTimeout { .. })
        ));
        release_tx.send(()).unwrap();
        holder.join().unwrap();
        assert!(acquire_session(&session, None, Duration::from_millis(20)).is_ok());
    }
}

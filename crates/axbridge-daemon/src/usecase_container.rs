use std::sync::Arc;

use axbridge_ipc::error_codes;
use axbridge_ipc::{RpcRequest, RpcResponse};
use tracing::{info, warn};

use crate::bridge::{AutomationBridge, GLOBAL_BRIDGE};
use crate::config::DaemonConfig;
use crate::handlers;
use crate::platform::AutomationPlatform;
use crate::repository::SessionRepository;
use crate::session::SessionManager;
use crate::usecases::{
    ClickUseCaseImpl, CreateSessionUseCaseImpl, DeleteSessionUseCaseImpl, FindElementUseCaseImpl,
    GetAttributeUseCaseImpl, GetSettingsUseCaseImpl, ReleaseElementUseCaseImpl,
    SendKeysUseCaseImpl, SessionsUseCaseImpl, SourceUseCaseImpl, StatusUseCaseImpl,
    UpdateSettingsUseCaseImpl, WaitForIdleUseCaseImpl,
};

/// Container holding all use case implementations.
///
/// This enables dependency injection and makes handlers testable
/// by allowing different use case implementations to be injected.
pub struct UseCaseContainer<R: SessionRepository + 'static> {
    pub session: SessionUseCases<R>,
    pub elements: ElementUseCases<R>,
    pub settings: SettingsUseCases,
    pub wait: WaitForIdleUseCaseImpl,
}

/// Session-related use cases.
pub struct SessionUseCases<R: SessionRepository + 'static> {
    pub status: StatusUseCaseImpl,
    pub create: CreateSessionUseCaseImpl<R>,
    pub delete: DeleteSessionUseCaseImpl<R>,
    pub sessions: SessionsUseCaseImpl<R>,
}

/// Element-related use cases.
pub struct ElementUseCases<R: SessionRepository + 'static> {
    pub find: FindElementUseCaseImpl<R>,
    pub get_attribute: GetAttributeUseCaseImpl<R>,
    pub click: ClickUseCaseImpl<R>,
    pub send_keys: SendKeysUseCaseImpl<R>,
    pub release: ReleaseElementUseCaseImpl<R>,
    pub source: SourceUseCaseImpl<R>,
}

/// Settings-related use cases.
pub struct SettingsUseCases {
    pub get: GetSettingsUseCaseImpl,
    pub update: UpdateSettingsUseCaseImpl,
}

impl<R: SessionRepository + 'static> UseCaseContainer<R> {
    /// Create a new UseCaseContainer with all use cases initialized.
    pub fn new(repository: Arc<R>, bridge: Arc<AutomationBridge>, config: &DaemonConfig) -> Self {
        let lock_timeout = config.lock_timeout;
        Self {
            session: SessionUseCases {
                status: StatusUseCaseImpl::new(Arc::clone(&bridge)),
                create: CreateSessionUseCaseImpl::new(Arc::clone(&repository), Arc::clone(&bridge)),
                delete: DeleteSessionUseCaseImpl::new(Arc::clone(&repository)),
                sessions: SessionsUseCaseImpl::new(Arc::clone(&repository)),
            },
            elements: ElementUseCases {
                find: FindElementUseCaseImpl::new(Arc::clone(&repository), Arc::clone(&bridge))
                    .with_lock_timeout(lock_timeout)
                    .with_find_all_limit(config.find_all_limit),
                get_attribute: GetAttributeUseCaseImpl::new(
                    Arc::clone(&repository),
                    Arc::clone(&bridge),
                )
                .with_lock_timeout(lock_timeout),
                click: ClickUseCaseImpl::new(Arc::clone(&repository), Arc::clone(&bridge))
                    .with_lock_timeout(lock_timeout),
                send_keys: SendKeysUseCaseImpl::new(Arc::clone(&repository), Arc::clone(&bridge))
                    .with_lock_timeout(lock_timeout),
                release: ReleaseElementUseCaseImpl::new(Arc::clone(&repository))
                    .with_lock_timeout(lock_timeout),
                source: SourceUseCaseImpl::new(repository, Arc::clone(&bridge)),
            },
            settings: SettingsUseCases {
                get: GetSettingsUseCaseImpl::new(Arc::clone(&bridge)),
                update: UpdateSettingsUseCaseImpl::new(Arc::clone(&bridge)),
            },
            wait: WaitForIdleUseCaseImpl::new(bridge),
        }
    }

    /// Route a request to its handler by method name.
    pub fn dispatch(&self, request: RpcRequest) -> RpcResponse {
        info!(id = request.id, method = %request.method, "Command received");
        match request.method.as_str() {
            "status" => handlers::handle_status_uc(&self.session.status, request),
            "createSession" => handlers::handle_create_session_uc(&self.session.create, request),
            "deleteSession" => handlers::handle_delete_session_uc(&self.session.delete, request),
            "sessions" => handlers::handle_sessions_uc(&self.session.sessions, request),
            "waitForIdle" => handlers::handle_wait_for_idle_uc(&self.wait, request),
            "findElement" => handlers::handle_find_element_uc(&self.elements.find, request),
            "findElements" => handlers::handle_find_elements_uc(&self.elements.find, request),
            "getAttribute" => {
                handlers::handle_get_attribute_uc(&self.elements.get_attribute, request)
            }
            "click" => handlers::handle_click_uc(&self.elements.click, request),
            "sendKeys" => handlers::handle_send_keys_uc(&self.elements.send_keys, request),
            "releaseElement" => {
                handlers::handle_release_element_uc(&self.elements.release, request)
            }
            "source" => handlers::handle_source_uc(&self.elements.source, request),
            "getSettings" => handlers::handle_get_settings_uc(&self.settings.get, request),
            "updateSettings" => handlers::handle_update_settings_uc(&self.settings.update, request),
            other => {
                warn!(method = other, "Unknown method");
                RpcResponse::error(
                    request.id,
                    error_codes::METHOD_NOT_FOUND,
                    &format!("Method not found: {other}"),
                )
            }
        }
    }
}

impl UseCaseContainer<SessionManager> {
    /// Container over a fresh session store sized by `config`.
    pub fn from_config(bridge: Arc<AutomationBridge>, config: &DaemonConfig) -> Self {
        let repository = Arc::new(SessionManager::with_max_sessions(config.max_sessions));
        Self::new(repository, bridge, config)
    }

    /// Container over the process bridge, installing it on first use.
    pub fn with_platform(platform: Arc<dyn AutomationPlatform>, config: &DaemonConfig) -> Self {
        Self::from_config(GLOBAL_BRIDGE.install(platform, config), config)
    }
}

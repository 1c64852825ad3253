use std::sync::Arc;

use tracing::{info, warn};

use crate::bridge::AutomationBridge;
use crate::domain::{
    CreateSessionInput, CreateSessionOutput, DeleteSessionInput, DeleteSessionOutput,
    SessionsOutput, StatusOutput,
};
use crate::error::BridgeError;
use crate::repository::SessionRepository;

/// Use case for the readiness probe.
pub trait StatusUseCase: Send + Sync {
    fn execute(&self) -> StatusOutput;
}

pub struct StatusUseCaseImpl {
    bridge: Arc<AutomationBridge>,
}

impl StatusUseCaseImpl {
    pub fn new(bridge: Arc<AutomationBridge>) -> Self {
        Self { bridge }
    }
}

impl StatusUseCase for StatusUseCaseImpl {
    fn execute(&self) -> StatusOutput {
        let message = if self.bridge.platform().is_connected() {
            "Automation bridge is ready to accept commands"
        } else {
            "Automation bridge is up; waiting for the automation session to connect"
        };
        StatusOutput {
            ready: true,
            message: message.to_string(),
        }
    }
}

/// Use case for creating a session.
pub trait CreateSessionUseCase: Send + Sync {
    fn execute(&self, input: CreateSessionInput) -> Result<CreateSessionOutput, BridgeError>;
}

pub struct CreateSessionUseCaseImpl<R: SessionRepository> {
    repository: Arc<R>,
    bridge: Arc<AutomationBridge>,
}

impl<R: SessionRepository> CreateSessionUseCaseImpl<R> {
    pub fn new(repository: Arc<R>, bridge: Arc<AutomationBridge>) -> Self {
        Self { repository, bridge }
    }
}

impl<R: SessionRepository> CreateSessionUseCase for CreateSessionUseCaseImpl<R> {
    fn execute(&self, input: CreateSessionInput) -> Result<CreateSessionOutput, BridgeError> {
        let session_id = self
            .repository
            .create(input.session_id, input.capabilities.clone())?;

        let registry = self.bridge.registry();
        let mut applied_settings = Vec::new();
        for (name, value) in &input.capabilities {
            if !registry.contains(name) {
                continue;
            }
            match registry.set(name, value) {
                Ok(()) => applied_settings.push(name.clone()),
                Err(e) => warn!(%session_id, setting = %name, error = %e, "Capability not applied"),
            }
        }
        info!(%session_id, applied = applied_settings.len(), "Session ready");

        Ok(CreateSessionOutput {
            session_id,
            applied_settings,
        })
    }
}

/// Use case for deleting a session.
pub trait DeleteSessionUseCase: Send + Sync {
    fn execute(&self, input: DeleteSessionInput) -> Result<DeleteSessionOutput, BridgeError>;
}

pub struct DeleteSessionUseCaseImpl<R: SessionRepository> {
    repository: Arc<R>,
}

impl<R: SessionRepository> DeleteSessionUseCaseImpl<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R: SessionRepository> DeleteSessionUseCase for DeleteSessionUseCaseImpl<R> {
    fn execute(&self, input: DeleteSessionInput) -> Result<DeleteSessionOutput, BridgeError> {
        let session_id = match input.session_id {
            Some(id) => id,
            None => self
                .repository
                .active_session_id()
                .ok_or(BridgeError::NoActiveSession)?
                .to_string(),
        };
        let released_elements = self.repository.delete(&session_id)?;
        Ok(DeleteSessionOutput {
            session_id,
            released_elements,
        })
    }
}

/// Use case for listing sessions.
pub trait SessionsUseCase: Send + Sync {
    fn execute(&self) -> SessionsOutput;
}

pub struct SessionsUseCaseImpl<R: SessionRepository> {
    repository: Arc<R>,
}

impl<R: SessionRepository> SessionsUseCaseImpl<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }
}

impl<R: SessionRepository> SessionsUseCase for SessionsUseCaseImpl<R> {
    fn execute(&self) -> SessionsOutput {
        SessionsOutput {
            sessions: self.repository.list(),
            active_session: self.repository.active_session_id(),
        }
    }
}

use std::sync::Arc;
use std::time::Duration;

use axbridge_core::{FastSelector, Selector};
use tracing::{debug, info, warn};

use crate::bridge::AutomationBridge;
use crate::domain::{
    ClickInput, ElementSummary, FindElementInput, FindElementOutput, GetAttributeInput,
    GetAttributeOutput, ReleaseElementInput, SendKeysInput, SendKeysOutput,
};
use crate::element::ElementHandle;
use crate::error::BridgeError;
use crate::repository::SessionRepository;
use crate::resolver::{ElementResolver, DEFAULT_FIND_ALL_LIMIT};
use crate::session::{acquire_session, DEFAULT_LOCK_TIMEOUT};

/// Look up an element the session published earlier.
fn published_element<R: SessionRepository>(
    repository: &R,
    session_id: Option<&str>,
    element_id: &str,
    lock_timeout: Duration,
) -> Result<Arc<ElementHandle>, BridgeError> {
    let session = repository.resolve(session_id)?;
    let guard = acquire_session(&session, session_id, lock_timeout)?;
    let element = guard.element(element_id)?;
    Ok(element)
}

/// Use case for resolving a selector and publishing the matches.
pub trait FindElementUseCase: Send + Sync {
    fn execute(&self, input: FindElementInput) -> Result<FindElementOutput, BridgeError>;
}

pub struct FindElementUseCaseImpl<R: SessionRepository> {
    repository: Arc<R>,
    bridge: Arc<AutomationBridge>,
    lock_timeout: Duration,
    find_all_limit: usize,
}

impl<R: SessionRepository> FindElementUseCaseImpl<R> {
    pub fn new(repository: Arc<R>, bridge: Arc<AutomationBridge>) -> Self {
        Self {
            repository,
            bridge,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            find_all_limit: DEFAULT_FIND_ALL_LIMIT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    pub fn with_find_all_limit(mut self, limit: usize) -> Self {
        self.find_all_limit = limit;
        self
    }
}

impl<R: SessionRepository> FindElementUseCase for FindElementUseCaseImpl<R> {
    fn execute(&self, input: FindElementInput) -> Result<FindElementOutput, BridgeError> {
        let session_id = input.session_id.as_deref();
        let session = self.repository.resolve(session_id)?;
        let scope = match input.context_id.as_deref() {
            Some(context_id) => {
                Some(acquire_session(&session, session_id, self.lock_timeout)?.element(context_id)?)
            }
            None => None,
        };

        let resolver = ElementResolver::new(&self.bridge).with_limit(self.find_all_limit);
        let handles = if input.multiple {
            resolver.find_all(&input.selector, scope.as_deref())?
        } else {
            let found = resolver.find(&input.selector, scope.as_deref())?;
            vec![found.ok_or_else(|| BridgeError::ElementNotFound {
                target: input.selector.to_string(),
            })?]
        };

        let mut described = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.info(&self.bridge) {
                Ok(info) => described.push((handle, info)),
                Err(e) if input.multiple => {
                    debug!(selector = %handle.selector(), error = %e, "Match vanished before publishing")
                }
                Err(e) => return Err(e),
            }
        }

        let mut guard = acquire_session(&session, session_id, self.lock_timeout)?;
        let elements: Vec<ElementSummary> = described
            .into_iter()
            .map(|(handle, info)| ElementSummary {
                element_id: guard.known_elements_mut().put(handle),
                class_name: info.class_name,
                text: info.text,
                bounds: info.bounds,
            })
            .collect();
        info!(
            selector = %input.selector,
            published = elements.len(),
            known = guard.known_elements().len(),
            "Elements published"
        );

        Ok(FindElementOutput { elements })
    }
}

/// Use case for reading one attribute of a published element.
pub trait GetAttributeUseCase: Send + Sync {
    fn execute(&self, input: GetAttributeInput) -> Result<GetAttributeOutput, BridgeError>;
}

pub struct GetAttributeUseCaseImpl<R: SessionRepository> {
    repository: Arc<R>,
    bridge: Arc<AutomationBridge>,
    lock_timeout: Duration,
}

impl<R: SessionRepository> GetAttributeUseCaseImpl<R> {
    pub fn new(repository: Arc<R>, bridge: Arc<AutomationBridge>) -> Self {
        Self {
            repository,
            bridge,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }
}

impl<R: SessionRepository> GetAttributeUseCase for GetAttributeUseCaseImpl<R> {
    fn execute(&self, input: GetAttributeInput) -> Result<GetAttributeOutput, BridgeError> {
        let element = published_element(
            self.repository.as_ref(),
            input.session_id.as_deref(),
            &input.element_id,
            self.lock_timeout,
        )?;
        let value = element.get_attribute(&self.bridge, &input.name)?;
        Ok(GetAttributeOutput { value })
    }
}

/// Use case for clicking a published element.
pub trait ClickUseCase: Send + Sync {
    fn execute(&self, input: ClickInput) -> Result<(), BridgeError>;
}

pub struct ClickUseCaseImpl<R: SessionRepository> {
    repository: Arc<R>,
    bridge: Arc<AutomationBridge>,
    lock_timeout: Duration,
}

impl<R: SessionRepository> ClickUseCaseImpl<R> {
    pub fn new(repository: Arc<R>, bridge: Arc<AutomationBridge>) -> Self {
        Self {
            repository,
            bridge,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }
}

impl<R: SessionRepository> ClickUseCase for ClickUseCaseImpl<R> {
    fn execute(&self, input: ClickInput) -> Result<(), BridgeError> {
        let element = published_element(
            self.repository.as_ref(),
            input.session_id.as_deref(),
            &input.element_id,
            self.lock_timeout,
        )?;
        self.bridge.wait_quickly_for_idle();
        element.click(&self.bridge)
    }
}

/// Text ending in a newline, written either as the escape sequence `\n`
/// or as a real line feed, requests Enter; every newline of that form is
/// then dropped from the typed text.
fn split_enter(text: &str) -> (String, bool) {
    if text.ends_with("\\n") {
        return (text.replace("\\n", ""), true);
    }
    if text.ends_with('\n') {
        return (text.replace('\n', ""), true);
    }
    (text.to_string(), false)
}

/// Use case for typing into a published or the focused element.
pub trait SendKeysUseCase: Send + Sync {
    fn execute(&self, input: SendKeysInput) -> Result<SendKeysOutput, BridgeError>;
}

pub struct SendKeysUseCaseImpl<R: SessionRepository> {
    repository: Arc<R>,
    bridge: Arc<AutomationBridge>,
    lock_timeout: Duration,
}

impl<R: SessionRepository> SendKeysUseCaseImpl<R> {
    pub fn new(repository: Arc<R>, bridge: Arc<AutomationBridge>) -> Self {
        Self {
            repository,
            bridge,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    fn focused_element(&self) -> Result<Arc<ElementHandle>, BridgeError> {
        let selector = Selector::Fast(FastSelector {
            focused: Some(true),
            ..FastSelector::default()
        });
        ElementResolver::new(&self.bridge)
            .find(&selector, None)?
            .map(Arc::new)
            .ok_or_else(|| BridgeError::ElementNotFound {
                target: "focused element".to_string(),
            })
    }
}

impl<R: SessionRepository> SendKeysUseCase for SendKeysUseCaseImpl<R> {
    fn execute(&self, input: SendKeysInput) -> Result<SendKeysOutput, BridgeError> {
        let element = match input.element_id.as_deref() {
            Some(element_id) => published_element(
                self.repository.as_ref(),
                input.session_id.as_deref(),
                element_id,
                self.lock_timeout,
            )?,
            None => {
                self.repository.resolve(input.session_id.as_deref())?;
                self.focused_element()?
            }
        };
        self.bridge.wait_quickly_for_idle();

        let (typed, press_enter) = split_enter(&input.text);
        let mut text = typed.clone();
        if !input.replace {
            let current = element.get_text(&self.bridge)?;
            if !current.is_empty() {
                element.clear(&self.bridge)?;
                if element.get_text(&self.bridge)?.is_empty() {
                    text = format!("{current}{typed}");
                } else {
                    debug!(hint = %current, "Field shows a hint; not appending to it");
                }
            }
        }

        if !element.set_text(&self.bridge, &text)? {
            return Err(BridgeError::InvalidState {
                message: format!("text could not be set on {}", element.selector()),
            });
        }

        let pressed_enter = press_enter && {
            let pressed = self.bridge.platform().press_enter();
            if !pressed {
                warn!("Enter key press was not delivered");
            }
            pressed
        };
        Ok(SendKeysOutput { pressed_enter })
    }
}

/// Use case for dropping a published element.
pub trait ReleaseElementUseCase: Send + Sync {
    fn execute(&self, input: ReleaseElementInput) -> Result<(), BridgeError>;
}

pub struct ReleaseElementUseCaseImpl<R: SessionRepository> {
    repository: Arc<R>,
    lock_timeout: Duration,
}

impl<R: SessionRepository> ReleaseElementUseCaseImpl<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }
}

impl<R: SessionRepository> ReleaseElementUseCase for ReleaseElementUseCaseImpl<R> {
    fn execute(&self, input: ReleaseElementInput) -> Result<(), BridgeError> {
        let session_id = input.session_id.as_deref();
        let session = self.repository.resolve(session_id)?;
        let mut guard = acquire_session(&session, session_id, self.lock_timeout)?;
        guard.known_elements_mut().remove(&input.element_id)?;
        debug!(element_id = %input.element_id, "Element released");
        Ok(())
    }
}

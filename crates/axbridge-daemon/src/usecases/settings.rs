use std::sync::Arc;

use tracing::info;

use crate::bridge::AutomationBridge;
use crate::domain::{SettingsOutput, UpdateSettingsInput};
use crate::error::BridgeError;

/// Use case for reading every setting.
pub trait GetSettingsUseCase: Send + Sync {
    fn execute(&self) -> SettingsOutput;
}

pub struct GetSettingsUseCaseImpl {
    bridge: Arc<AutomationBridge>,
}

impl GetSettingsUseCaseImpl {
    pub fn new(bridge: Arc<AutomationBridge>) -> Self {
        Self { bridge }
    }
}

impl GetSettingsUseCase for GetSettingsUseCaseImpl {
    fn execute(&self) -> SettingsOutput {
        SettingsOutput {
            settings: self.bridge.registry().snapshot(),
        }
    }
}

/// Use case for applying a batch of settings.
///
/// The batch is all-or-nothing; on success the full snapshot is returned.
pub trait UpdateSettingsUseCase: Send + Sync {
    fn execute(&self, input: UpdateSettingsInput) -> Result<SettingsOutput, BridgeError>;
}

pub struct UpdateSettingsUseCaseImpl {
    bridge: Arc<AutomationBridge>,
}

impl UpdateSettingsUseCaseImpl {
    pub fn new(bridge: Arc<AutomationBridge>) -> Self {
        Self { bridge }
    }
}

impl UpdateSettingsUseCase for UpdateSettingsUseCaseImpl {
    fn execute(&self, input: UpdateSettingsInput) -> Result<SettingsOutput, BridgeError> {
        let registry = self.bridge.registry();
        registry.set_many(&input.settings)?;
        info!(count = input.settings.len(), "Settings updated");
        Ok(SettingsOutput {
            settings: registry.snapshot(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{USE_DEVICE_REAL_SIZE, WAIT_FOR_IDLE_TIMEOUT};
    use crate::test_support::{bridge_on, MockPlatform};
    use serde_json::{json, Value};

    fn bridge() -> Arc<AutomationBridge> {
        Arc::new(bridge_on(&Arc::new(MockPlatform::builder().build())))
    }

    fn batch(value: Value) -> UpdateSettingsInput {
        UpdateSettingsInput {
            settings: value.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_get_settings_lists_defaults() {
        let output = GetSettingsUseCaseImpl::new(bridge()).execute();
        assert_eq!(output.settings[WAIT_FOR_IDLE_TIMEOUT], json!(3000));
        assert_eq!(output.settings[USE_DEVICE_REAL_SIZE], json!(false));
    }

    #[test]
    fn test_update_settings_returns_new_snapshot() {
        let output = UpdateSettingsUseCaseImpl::new(bridge())
            .execute(batch(json!({ "useDeviceRealSize": true, "waitForIdleTimeout": 10 })))
            .unwrap();
        assert_eq!(output.settings[USE_DEVICE_REAL_SIZE], json!(true));
        assert_eq!(output.settings[WAIT_FOR_IDLE_TIMEOUT], json!(10));
    }

    #[test]
    fn test_update_settings_rejects_whole_batch_on_type_mismatch() {
        let bridge = bridge();
        let result = UpdateSettingsUseCaseImpl::new(Arc::clone(&bridge))
            .execute(batch(json!({ "useDeviceRealSize": true, "waitForIdleTimeout": "fast" })));
        assert!(matches!(result, Err(BridgeError::TypeMismatch { .. })));
        assert!(!bridge.registry().use_device_real_size());
    }

    #[test]
    fn test_update_settings_rejects_unknown_name() {
        let result = UpdateSettingsUseCaseImpl::new(bridge()).execute(batch(json!({ "nope": 1 })));
        assert!(matches!(result, Err(BridgeError::InvalidArgument(_))));
    }
}

mod mock_platform;
mod mock_repository;

use std::sync::Arc;

pub use mock_platform::MockPlatform;
pub use mock_repository::MockSessionRepository;

use crate::bridge::AutomationBridge;
use crate::clock::MockClock;
use crate::platform::AutomationPlatform;
use crate::settings::ConfigRegistry;

/// A configured bridge over `platform` with a fresh registry and virtual time.
pub fn bridge_on(platform: &Arc<MockPlatform>) -> AutomationBridge {
    let bridge = AutomationBridge::new(
        Arc::clone(platform) as Arc<dyn AutomationPlatform>,
        Arc::new(ConfigRegistry::new()),
    )
    .with_clock(Arc::new(MockClock::new()));
    bridge.configure();
    bridge
}

use std::sync::Arc;

use tracing::debug;

use crate::bridge::AutomationBridge;
use crate::domain::{WaitForIdleInput, WaitForIdleOutput};

/// Use case for blocking until the UI goes quiet.
///
/// Never fails: hitting the ceiling is reported through `settled: false`.
pub trait WaitForIdleUseCase: Send + Sync {
    fn execute(&self, input: WaitForIdleInput) -> WaitForIdleOutput;
}

pub struct WaitForIdleUseCaseImpl {
    bridge: Arc<AutomationBridge>,
}

impl WaitForIdleUseCaseImpl {
    pub fn new(bridge: Arc<AutomationBridge>) -> Self {
        Self { bridge }
    }
}

impl WaitForIdleUseCase for WaitForIdleUseCaseImpl {
    fn execute(&self, input: WaitForIdleInput) -> WaitForIdleOutput {
        let wait = self
            .bridge
            .wait_for_idle(input.idle_timeout, input.global_timeout);
        debug!(elapsed_ms = wait.elapsed_ms(), settled = wait.settled, "Idle wait finished");
        WaitForIdleOutput {
            elapsed_ms: wait.elapsed_ms(),
            settled: wait.settled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bridge_on, MockPlatform};
    use std::time::Duration;

    #[test]
    fn test_quiet_tree_settles() {
        let platform = Arc::new(MockPlatform::builder().build());
        let usecase = WaitForIdleUseCaseImpl::new(Arc::new(bridge_on(&platform)));

        let output = usecase.execute(WaitForIdleInput {
            idle_timeout: Some(Duration::from_millis(100)),
            global_timeout: Some(Duration::from_millis(500)),
        });
        assert!(output.settled);
        assert!(output.elapsed_ms < 500);
    }

    #[test]
    fn test_busy_tree_reports_elapsed_instead_of_failing() {
        let platform = Arc::new(MockPlatform::builder().build());
        platform.memory_tree().set_churning(true);
        let usecase = WaitForIdleUseCaseImpl::new(Arc::new(bridge_on(&platform)));

        let output = usecase.execute(WaitForIdleInput {
            idle_timeout: Some(Duration::from_millis(100)),
            global_timeout: Some(Duration::from_millis(500)),
        });
        assert!(!output.settled);
        assert!((500..600).contains(&output.elapsed_ms));
    }
}

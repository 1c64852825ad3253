//! The process-wide automation bridge.
//!
//! The bridge owns the platform session handle and is the only place that
//! decides whether the UI has settled. It is created once per process through
//! a [`BridgeSlot`]; `configure()` runs exactly once, at installation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axbridge_common::mutex_lock_or_recover;
use axbridge_core::{NodeId, UiTree};
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, RealClock};
use crate::config::DaemonConfig;
use crate::error::BridgeError;
use crate::geometry::GeometryHelper;
use crate::platform::{AutomationPlatform, ServiceFlags};
use crate::settings::ConfigRegistry;

/// Ceiling for one idle wait when the caller does not give one.
pub const DEFAULT_GLOBAL_IDLE_TIMEOUT: Duration = Duration::from_millis(5000);
pub const QUICK_IDLE_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
const OVERRUN_MARGIN: Duration = Duration::from_millis(1000);

/// Outcome of an idle wait. Not settling in time is a normal result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleWait {
    pub elapsed: Duration,
    pub settled: bool,
}

impl IdleWait {
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Tracks how long the tree generation has stayed unchanged.
struct QuietTracker {
    generation: u64,
    quiet_since: std::time::Instant,
}

impl QuietTracker {
    fn new(generation: u64, now: std::time::Instant) -> Self {
        Self {
            generation,
            quiet_since: now,
        }
    }

    /// Record an observation; returns how long the tree has been quiet.
    fn observe(&mut self, generation: u64, now: std::time::Instant) -> Duration {
        if generation != self.generation {
            self.generation = generation;
            self.quiet_since = now;
        }
        now.saturating_duration_since(self.quiet_since)
    }
}

pub struct AutomationBridge {
    platform: Arc<dyn AutomationPlatform>,
    registry: Arc<ConfigRegistry>,
    clock: Arc<dyn Clock>,
    poll_interval: Duration,
    applied_revision: AtomicU64,
}

impl AutomationBridge {
    pub fn new(platform: Arc<dyn AutomationPlatform>, registry: Arc<ConfigRegistry>) -> Self {
        Self {
            platform,
            registry,
            clock: Arc::new(RealClock),
            poll_interval: DEFAULT_POLL_INTERVAL,
            applied_revision: AtomicU64::new(u64::MAX),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_config(self, config: &DaemonConfig) -> Self {
        self.with_poll_interval(config.idle_poll_interval)
    }

    /// Build and configure in one step, outside any slot.
    pub fn configured(
        platform: Arc<dyn AutomationPlatform>,
        registry: Arc<ConfigRegistry>,
    ) -> Self {
        let bridge = Self::new(platform, registry);
        bridge.configure();
        bridge
    }

    pub fn platform(&self) -> &Arc<dyn AutomationPlatform> {
        &self.platform
    }

    pub fn registry(&self) -> &Arc<ConfigRegistry> {
        &self.registry
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn tree(&self) -> Arc<dyn UiTree> {
        self.platform.tree()
    }

    pub fn geometry(&self) -> GeometryHelper<'_> {
        GeometryHelper::new(self.platform.as_ref(), &self.registry)
    }

    /// Apply service flags and the platform idle default. Failures are
    /// logged; a partially configured bridge keeps working.
    pub fn configure(&self) {
        let revision = self.registry.revision();
        self.apply_service_flags();
        if let Err(e) = self
            .platform
            .set_default_idle_timeout(DEFAULT_GLOBAL_IDLE_TIMEOUT)
        {
            warn!(error = %e, "Failed to set default idle timeout");
        }
        self.applied_revision.store(revision, Ordering::SeqCst);
        info!(flags = %self.platform.service_flags(), "Automation bridge configured");
    }

    fn apply_service_flags(&self) {
        let base = self.platform.service_flags()
            | ServiceFlags::REPORT_VIEW_IDS
            | ServiceFlags::RETRIEVE_INTERACTIVE_WINDOWS;
        let flags = if self.registry.dont_suppress_accessibility_services() {
            base | ServiceFlags::DONT_SUPPRESS_ACCESSIBILITY_SERVICES
        } else {
            base.without(ServiceFlags::DONT_SUPPRESS_ACCESSIBILITY_SERVICES)
        };
        if let Err(e) = self.platform.set_service_flags(flags) {
            warn!(error = %e, %flags, "Failed to apply service flags");
        }
    }

    /// Re-apply service flags if settings changed since the last query.
    fn refresh(&self) {
        let revision = self.registry.revision();
        if self.applied_revision.swap(revision, Ordering::SeqCst) != revision {
            debug!(revision, "Settings changed, re-applying service flags");
            self.apply_service_flags();
        }
    }

    /// Current root of the accessibility tree, retried until
    /// `axRootRetrievalTimeout` elapses.
    pub fn get_root_node(&self) -> Result<NodeId, BridgeError> {
        if !self.platform.is_connected() {
            return Err(BridgeError::BridgeUnavailable {
                reason: "automation session is not connected".to_string(),
            });
        }
        self.refresh();

        let timeout = self.registry.ax_root_retrieval_timeout();
        let tree = self.platform.tree();
        let start = self.clock.now();
        loop {
            if let Some(root) = tree.root() {
                return Ok(root);
            }
            let waited = self.clock.now().saturating_duration_since(start);
            if waited >= timeout {
                return Err(BridgeError::BridgeUnavailable {
                    reason: format!(
                        "root node not available after {}ms",
                        timeout.as_millis()
                    ),
                });
            }
            self.clock.sleep(self.poll_interval.min(timeout - waited));
        }
    }

    /// Block until the tree has been quiet for `idle`, or `global` elapsed.
    ///
    /// `idle` defaults to the `waitForIdleTimeout` setting and `global` to
    /// [`DEFAULT_GLOBAL_IDLE_TIMEOUT`].
    pub fn wait_for_idle(&self, idle: Option<Duration>, global: Option<Duration>) -> IdleWait {
        let idle = idle.unwrap_or_else(|| self.registry.wait_for_idle_timeout());
        let global = global.unwrap_or(DEFAULT_GLOBAL_IDLE_TIMEOUT);
        let tree = self.platform.tree();
        let start = self.clock.now();
        let mut tracker = QuietTracker::new(tree.generation(), start);

        let settled = loop {
            let now = self.clock.now();
            let elapsed = now.saturating_duration_since(start);
            if tracker.observe(tree.generation(), now) >= idle {
                break true;
            }
            if elapsed >= global {
                break false;
            }
            if !self.platform.is_connected() {
                error!("Automation session dropped while waiting for idle");
                break false;
            }
            self.clock.sleep(self.poll_interval.min(global - elapsed));
        };

        let elapsed = self.clock.now().saturating_duration_since(start);
        if elapsed > global + OVERRUN_MARGIN {
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                global_ms = global.as_millis() as u64,
                "Idle wait overran its ceiling"
            );
        }
        debug!(
            idle_ms = idle.as_millis() as u64,
            elapsed_ms = elapsed.as_millis() as u64,
            settled,
            "Idle wait finished"
        );
        IdleWait { elapsed, settled }
    }

    /// Short idle wait used before element interactions.
    pub fn wait_quickly_for_idle(&self) -> IdleWait {
        self.wait_for_idle(Some(QUICK_IDLE_TIMEOUT), Some(DEFAULT_GLOBAL_IDLE_TIMEOUT))
    }
}

/// Holder for the single bridge instance of a process.
pub struct BridgeSlot {
    inner: Mutex<Option<Arc<AutomationBridge>>>,
}

impl Default for BridgeSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeSlot {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    /// Return the installed bridge, building and configuring it on first use.
    pub fn get_or_configure<F>(&self, factory: F) -> Arc<AutomationBridge>
    where
        F: FnOnce() -> AutomationBridge,
    {
        let mut slot = mutex_lock_or_recover(&self.inner);
        if let Some(bridge) = slot.as_ref() {
            return Arc::clone(bridge);
        }
        let bridge = Arc::new(factory());
        bridge.configure();
        *slot = Some(Arc::clone(&bridge));
        bridge
    }

    /// Install a bridge over `platform` and the process-wide settings
    /// registry. Once a bridge is installed, later calls return it and
    /// ignore their arguments.
    pub fn install(
        &self,
        platform: Arc<dyn AutomationPlatform>,
        config: &DaemonConfig,
    ) -> Arc<AutomationBridge> {
        self.get_or_configure(|| {
            AutomationBridge::new(platform, ConfigRegistry::global()).with_config(config)
        })
    }

    pub fn current(&self) -> Result<Arc<AutomationBridge>, BridgeError> {
        mutex_lock_or_recover(&self.inner)
            .clone()
            .ok_or_else(|| BridgeError::BridgeUnavailable {
                reason: "automation bridge has not been initialized".to_string(),
            })
    }

    /// Tear down the installed bridge, if any.
    pub fn reset(&self) -> Option<Arc<AutomationBridge>> {
        mutex_lock_or_recover(&self.inner).take()
    }
}

/// The bridge of this process.
pub static GLOBAL_BRIDGE: BridgeSlot = BridgeSlot::new();

//! In-memory automation platform for tests.
//!
//! Backed by a `MemoryTree`; gestures and key presses are recorded rather
//! than injected so tests can assert on exactly what reached the device.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axbridge_common::mutex_lock_or_recover;
use axbridge_core::{Gesture, MemoryTree, NodeInfo, Size, UiTree};

use crate::platform::{AutomationPlatform, PlatformError, ServiceFlags};

pub struct MockPlatform {
    tree: Arc<MemoryTree>,
    connected: AtomicBool,
    fail_configuration: bool,
    reject_gestures: AtomicBool,
    flags: Mutex<ServiceFlags>,
    idle_timeout: Mutex<Option<Duration>>,
    display: Size,
    real_display: Size,
    gestures: Mutex<Vec<Gesture>>,
    flag_sets: AtomicUsize,
    enter_presses: AtomicUsize,
}

impl MockPlatform {
    pub fn builder() -> MockPlatformBuilder {
        MockPlatformBuilder::new()
    }

    pub fn memory_tree(&self) -> Arc<MemoryTree> {
        Arc::clone(&self.tree)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn set_rejecting_gestures(&self, reject: bool) {
        self.reject_gestures.store(reject, Ordering::SeqCst);
    }

    /// Gestures received so far, in order.
    pub fn gestures(&self) -> Vec<Gesture> {
        mutex_lock_or_recover(&self.gestures).clone()
    }

    pub fn last_gesture(&self) -> Option<Gesture> {
        mutex_lock_or_recover(&self.gestures).last().cloned()
    }

    /// Number of `set_service_flags` calls, including failed ones.
    pub fn flag_set_count(&self) -> usize {
        self.flag_sets.load(Ordering::SeqCst)
    }

    pub fn enter_count(&self) -> usize {
        self.enter_presses.load(Ordering::SeqCst)
    }

    pub fn default_idle_timeout(&self) -> Option<Duration> {
        *mutex_lock_or_recover(&self.idle_timeout)
    }
}

impl AutomationPlatform for MockPlatform {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn tree(&self) -> Arc<dyn UiTree> {
        Arc::clone(&self.tree) as Arc<dyn UiTree>
    }

    fn service_flags(&self) -> ServiceFlags {
        *mutex_lock_or_recover(&self.flags)
    }

    fn set_service_flags(&self, flags: ServiceFlags) -> Result<(), PlatformError> {
        self.flag_sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_configuration {
            return Err(PlatformError::Rejected {
                operation: "setServiceFlags".to_string(),
                reason: "mock configured to fail".to_string(),
            });
        }
        *mutex_lock_or_recover(&self.flags) = flags;
        Ok(())
    }

    fn set_default_idle_timeout(&self, timeout: Duration) -> Result<(), PlatformError> {
        if self.fail_configuration {
            return Err(PlatformError::Disconnected);
        }
        *mutex_lock_or_recover(&self.idle_timeout) = Some(timeout);
        Ok(())
    }

    fn display_size(&self) -> Size {
        self.display
    }

    fn real_display_size(&self) -> Size {
        self.real_display
    }

    fn perform_gesture(&self, gesture: &Gesture) -> bool {
        if self.reject_gestures.load(Ordering::SeqCst) {
            return false;
        }
        mutex_lock_or_recover(&self.gestures).push(gesture.clone());
        true
    }

    fn press_enter(&self) -> bool {
        self.enter_presses.fetch_add(1, Ordering::SeqCst);
        true
    }
}

pub struct MockPlatformBuilder {
    display: Size,
    real_display: Size,
    connected: bool,
    fail_configuration: bool,
    with_root: bool,
}

impl Default for MockPlatformBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatformBuilder {
    pub fn new() -> Self {
        Self {
            display: Size::new(1080, 2220),
            real_display: Size::new(1080, 2340),
            connected: true,
            fail_configuration: false,
            with_root: true,
        }
    }

    pub fn display_size(mut self, size: Size) -> Self {
        self.display = size;
        self
    }

    pub fn real_display_size(mut self, size: Size) -> Self {
        self.real_display = size;
        self
    }

    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }

    /// Make every configuration call on the platform fail.
    pub fn failing_configuration(mut self) -> Self {
        self.fail_configuration = true;
        self
    }

    /// Start with an empty tree instead of a full-screen frame root.
    pub fn empty_tree(mut self) -> Self {
        self.with_root = false;
        self
    }

    pub fn build(self) -> MockPlatform {
        let tree = Arc::new(MemoryTree::new());
        if self.with_root {
            tree.set_root(
                NodeInfo::new("android.widget.FrameLayout")
                    .with_package("com.example.app")
                    .with_bounds(self.display.as_rect()),
            );
        }
        MockPlatform {
            tree,
            connected: AtomicBool::new(self.connected),
            fail_configuration: self.fail_configuration,
            reject_gestures: AtomicBool::new(false),
            flags: Mutex::new(ServiceFlags::NONE),
            idle_timeout: Mutex::new(None),
            display: self.display,
            real_display: self.real_display,
            gestures: Mutex::new(Vec::new()),
            flag_sets: AtomicUsize::new(0),
            enter_presses: AtomicUsize::new(0),
        }
    }
}

//! Time source used by the polling waits.
//!
//! `RealClock` reads the monotonic clock and really sleeps. `MockClock` keeps
//! virtual time: `sleep` advances it instantly, which makes idle-wait and
//! root-retrieval timing deterministic in tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use axbridge_common::mutex_lock_or_recover;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealClock;

impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Virtual clock that records every sleep.
#[derive(Debug)]
pub struct MockClock {
    origin: Instant,
    offset_us: AtomicU64,
    sleeps: Mutex<Vec<Duration>>,
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_us: AtomicU64::new(0),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn advance(&self, duration: Duration) {
        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.offset_us.fetch_add(micros, Ordering::SeqCst);
    }

    /// Virtual time elapsed since construction.
    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.offset_us.load(Ordering::SeqCst))
    }

    pub fn sleep_count(&self) -> usize {
        mutex_lock_or_recover(&self.sleeps).len()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        mutex_lock_or_recover(&self.sleeps).clone()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        mutex_lock_or_recover(&self.sleeps).push(duration);
        self.advance(duration);
    }
}

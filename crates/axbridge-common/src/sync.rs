use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;
use std::sync::TryLockError;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use tracing::warn;

const INITIAL_BACKOFF: Duration = Duration::from_micros(100);
const MAX_BACKOFF: Duration = Duration::from_millis(50);

static POISON_RECOVERY_COUNT: AtomicU64 = AtomicU64::new(0);

/// Number of poisoned locks recovered since process start.
pub fn poison_recovery_count() -> u64 {
    POISON_RECOVERY_COUNT.load(Ordering::Relaxed)
}

fn record_poison_recovery(kind: &'static str) {
    POISON_RECOVERY_COUNT.fetch_add(1, Ordering::Relaxed);
    warn!(
        lock = kind,
        "recovering poisoned lock; a worker panicked while holding it"
    );
}

pub fn rwlock_read_or_recover<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| {
        record_poison_recovery("rwlock-read");
        poisoned.into_inner()
    })
}

pub fn rwlock_write_or_recover<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| {
        record_poison_recovery("rwlock-write");
        poisoned.into_inner()
    })
}

pub fn mutex_lock_or_recover<T>(lock: &Mutex<T>) -> MutexGuard<'_, T> {
    lock.lock().unwrap_or_else(|poisoned| {
        record_poison_recovery("mutex");
        poisoned.into_inner()
    })
}

/// Try to take `lock` within `timeout`, backing off exponentially between attempts.
///
/// Returns `None` when the timeout elapses while another thread still holds it.
pub fn mutex_try_lock_for<T>(lock: &Mutex<T>, timeout: Duration) -> Option<MutexGuard<'_, T>> {
    let start = Instant::now();
    let mut backoff = INITIAL_BACKOFF;

    loop {
        match lock.try_lock() {
            Ok(guard) => return Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => {
                record_poison_recovery("mutex");
                return Some(poisoned.into_inner());
            }
            Err(TryLockError::WouldBlock) => {}
        }
        if start.elapsed() >= timeout {
            return None;
        }
        thread::sleep(backoff);
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}

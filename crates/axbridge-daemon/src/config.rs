use std::env;
use std::time::Duration;

use crate::bridge::DEFAULT_POLL_INTERVAL;
use crate::resolver::DEFAULT_FIND_ALL_LIMIT;
use crate::session::{DEFAULT_LOCK_TIMEOUT, DEFAULT_MAX_SESSIONS};

/// Process configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub max_sessions: usize,
    pub find_all_limit: usize,
    pub idle_poll_interval: Duration,
    pub lock_timeout: Duration,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        Self {
            max_sessions: env_parse("AXBRIDGE_MAX_SESSIONS").unwrap_or(DEFAULT_MAX_SESSIONS),
            find_all_limit: env_parse("AXBRIDGE_FIND_ALL_LIMIT")
                .filter(|limit: &usize| *limit > 0)
                .unwrap_or(DEFAULT_FIND_ALL_LIMIT),
            idle_poll_interval: env_parse("AXBRIDGE_IDLE_POLL_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            lock_timeout: env_parse("AXBRIDGE_LOCK_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_LOCK_TIMEOUT),
        }
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    pub fn with_find_all_limit(mut self, limit: usize) -> Self {
        self.find_all_limit = limit;
        self
    }

    pub fn with_idle_poll_interval(mut self, interval: Duration) -> Self {
        self.idle_poll_interval = interval;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }
}

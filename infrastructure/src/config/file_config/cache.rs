//! Response cache settings from TOML (`[cache]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw cache configuration
///
/// # Example
///
/// ```toml
/// [cache]
/// enabled = true
/// ttl_seconds = 86400
/// capacity = 1024
/// timeout_ms = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    pub enabled: bool,
    pub ttl_seconds: u64,
    /// Maximum number of cached responses
    pub capacity: usize,
    /// Upper bound on a single cache read or write
    pub timeout_ms: u64,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: 24 * 60 * 60,
            capacity: 1024,
            timeout_ms: 1000,
        }
    }
}

impl FileCacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

//! Resilience settings from TOML (`[resilience]` section)

use consilium_domain::{CircuitPolicy, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw circuit breaker and retry configuration
///
/// # Example
///
/// ```toml
/// [resilience]
/// failure_threshold = 5
/// reset_timeout_seconds = 60
/// max_attempts = 5
/// backoff_min_seconds = 2
/// backoff_max_seconds = 60
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileResilienceConfig {
    /// Consecutive failed calls that open an endpoint's circuit
    pub failure_threshold: u32,
    pub reset_timeout_seconds: u64,
    /// Attempts per call, including the first
    pub max_attempts: u32,
    pub backoff_min_seconds: u64,
    pub backoff_max_seconds: u64,
}

impl Default for FileResilienceConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_seconds: 60,
            max_attempts: 5,
            backoff_min_seconds: 2,
            backoff_max_seconds: 60,
        }
    }
}

impl FileResilienceConfig {
    pub fn circuit_policy(&self) -> CircuitPolicy {
        CircuitPolicy {
            failure_threshold: self.failure_threshold,
            reset_timeout: Duration::from_secs(self.reset_timeout_seconds),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            min_delay: Duration::from_secs(self.backoff_min_seconds),
            max_delay: Duration::from_secs(self.backoff_max_seconds),
        }
    }
}

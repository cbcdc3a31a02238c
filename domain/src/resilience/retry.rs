//! Retry budget and exponential backoff schedule

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How many attempts a call gets and how long to wait between them.
///
/// The wait between attempt `k` and `k + 1` is
/// `min(max_delay, max(min_delay, 2^k seconds))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Backoff floor
    pub min_delay: Duration,
    /// Backoff cap
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn single_attempt() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponential = 2u64
            .checked_pow(attempt)
            .map(Duration::from_secs)
            .unwrap_or(Duration::MAX);
        exponential.max(self.min_delay).min(self.max_delay)
    }

    /// Whether another attempt is allowed after `attempts` have been made.
    pub fn allows_another(&self, attempts: u32) -> bool {
        attempts < self.max_attempts
    }
}

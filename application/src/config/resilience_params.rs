//! Resilience parameters - knobs for the resilient client.
//!
//! [`ResilienceParams`] groups the static parameters that control how
//! [`ResilientClient`](crate::resilience::ResilientClient) guards each
//! remote call: circuit thresholds, retry budget, cache TTL, and deadlines.

use consilium_domain::{CircuitPolicy, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResilienceParams {
    /// Circuit breaker thresholds (shared by every endpoint)
    pub circuit: CircuitPolicy,
    /// Attempt budget and backoff schedule
    pub retry: RetryPolicy,
    /// How long successful responses stay cached
    pub cache_ttl: Duration,
    /// Upper bound on any single cache operation
    pub cache_timeout: Duration,
    /// Overall deadline for one remote attempt
    pub call_timeout: Duration,
}

impl Default for ResilienceParams {
    fn default() -> Self {
        Self {
            circuit: CircuitPolicy::default(),
            retry: RetryPolicy::default(),
            cache_ttl: Duration::from_secs(24 * 60 * 60),
            cache_timeout: Duration::from_secs(1),
            call_timeout: Duration::from_secs(120),
        }
    }
}

impl ResilienceParams {
    // ==================== Builder Methods ====================

    pub fn with_circuit(mut self, circuit: CircuitPolicy) -> Self {
        self.circuit = circuit;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout = timeout;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

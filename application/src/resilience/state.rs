//! Shared resilience state - created once at process start.

use super::circuit_registry::CircuitRegistry;
use crate::ports::cache_store::{CacheStore, NoCache};
use consilium_domain::CircuitPolicy;
use std::sync::Arc;

/// Per-endpoint circuits plus the response cache.
///
/// Held behind an `Arc` and handed to every client, so concurrent
/// diagnoses observe and update the same circuits.
pub struct ResilienceState {
    circuits: CircuitRegistry,
    cache: Arc<dyn CacheStore>,
}

impl ResilienceState {
    pub fn new(policy: CircuitPolicy, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            circuits: CircuitRegistry::new(policy),
            cache,
        }
    }

    /// State with caching disabled
    pub fn without_cache(policy: CircuitPolicy) -> Self {
        Self::new(policy, Arc::new(NoCache))
    }

    pub fn circuits(&self) -> &CircuitRegistry {
        &self.circuits
    }

    pub fn cache(&self) -> &dyn CacheStore {
        self.cache.as_ref()
    }
}

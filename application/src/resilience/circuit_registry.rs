//! Process-wide registry of per-endpoint circuit state.

use consilium_domain::{Admission, CircuitPolicy, CircuitState, CircuitStatus};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Lazily created, never removed, circuit per endpoint id.
///
/// The outer map lock is held only to find or insert an entry; each
/// circuit has its own lock so endpoints never contend with each other.
/// No lock is ever held across an `.await`.
pub struct CircuitRegistry {
    policy: CircuitPolicy,
    circuits: Mutex<HashMap<String, Arc<Mutex<CircuitState>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CircuitRegistry {
    pub fn new(policy: CircuitPolicy) -> Self {
        Self {
            policy,
            circuits: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &CircuitPolicy {
        &self.policy
    }

    fn circuit(&self, endpoint_id: &str) -> Arc<Mutex<CircuitState>> {
        let mut circuits = lock(&self.circuits);
        Arc::clone(circuits.entry(endpoint_id.to_string()).or_default())
    }

    /// Ask whether a call to `endpoint_id` may proceed at `now`.
    pub fn admit(&self, endpoint_id: &str, now: Instant) -> Admission {
        let circuit = self.circuit(endpoint_id);
        let admission = lock(&circuit).admit(&self.policy, now);
        if admission == Admission::Probe {
            info!("Circuit for {} is half-open; admitting probe", endpoint_id);
        }
        admission
    }

    pub fn record_success(&self, endpoint_id: &str) {
        let circuit = self.circuit(endpoint_id);
        let mut state = lock(&circuit);
        if state.failure_count() > 0 {
            info!(
                "Circuit for {} closed after {} failure(s)",
                endpoint_id,
                state.failure_count()
            );
        }
        state.record_success();
    }

    pub fn record_failure(&self, endpoint_id: &str, now: Instant) -> CircuitStatus {
        let circuit = self.circuit(endpoint_id);
        let mut state = lock(&circuit);
        let status = state.record_failure(&self.policy, now);
        if status == CircuitStatus::Open {
            warn!(
                "Circuit for {} is open after {} consecutive failure(s); rejecting calls for {:?}",
                endpoint_id,
                state.failure_count(),
                self.policy.reset_timeout
            );
        }
        status
    }

    pub fn release_probe(&self, endpoint_id: &str) {
        let circuit = self.circuit(endpoint_id);
        lock(&circuit).release_probe();
    }

    /// Hold the probe slot for `endpoint_id` until the lease settles or drops.
    pub fn lease_probe<'a>(&'a self, endpoint_id: &'a str) -> ProbeLease<'a> {
        ProbeLease {
            registry: self,
            endpoint_id,
            held: true,
        }
    }

    /// Copy of the current state, if the endpoint has been used.
    pub fn snapshot(&self, endpoint_id: &str) -> Option<CircuitState> {
        let circuits = lock(&self.circuits);
        circuits.get(endpoint_id).map(|circuit| lock(circuit).clone())
    }

    pub fn status(&self, endpoint_id: &str, now: Instant) -> CircuitStatus {
        self.snapshot(endpoint_id)
            .map(|state| state.status(&self.policy, now))
            .unwrap_or(CircuitStatus::Closed)
    }
}

/// Claimed half-open probe.
///
/// Dropping the lease without settling it gives the slot back, so a probe
/// whose task is cancelled or aborted never wedges the circuit.
#[must_use = "dropping the lease releases the probe immediately"]
pub struct ProbeLease<'a> {
    registry: &'a CircuitRegistry,
    endpoint_id: &'a str,
    held: bool,
}

impl ProbeLease<'_> {
    /// The probe reached the network: close the circuit.
    pub fn succeed(mut self) {
        self.held = false;
        self.registry.record_success(self.endpoint_id);
    }

    /// The probe reached the network and failed: reopen the circuit.
    pub fn fail(mut self, now: Instant) -> CircuitStatus {
        self.held = false;
        self.registry.record_failure(self.endpoint_id, now)
    }
}

impl Drop for ProbeLease<'_> {
    fn drop(&mut self) {
        if self.held {
            debug!("Releasing unsettled probe for {}", self.endpoint_id);
            self.registry.release_probe(self.endpoint_id);
        }
    }
}

impl Default for CircuitRegistry {
    fn default() -> Self {
        Self::new(CircuitPolicy::default())
    }
}

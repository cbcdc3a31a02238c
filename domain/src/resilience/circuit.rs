//! Circuit breaker state machine for one remote endpoint.
//!
//! ```text
//!            failures >= threshold
//!   Closed ─────────────────────────▶ Open
//!     ▲                                 │ reset_timeout elapsed
//!     │ probe succeeds                  ▼
//!     └──────────────────────────── HalfOpen ──▶ Open (probe fails, timestamp refreshed)
//! ```
//!
//! Half-open is derived from the failure count and timestamp; it is never
//! stored. Only one probe is admitted at a time, and it holds its slot until
//! the owner records an outcome or calls `release_probe`.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Thresholds governing when an endpoint trips and when it may be probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitPolicy {
    /// Consecutive final failures that open the circuit
    pub failure_threshold: u32,
    /// Cooldown after the last failure before a probe is allowed
    pub reset_timeout: Duration,
}

impl Default for CircuitPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(60),
        }
    }
}

/// Observable status of a circuit at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitStatus {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitStatus::Closed => "closed",
            CircuitStatus::Open => "open",
            CircuitStatus::HalfOpen => "half_open",
        }
    }
}

/// Decision taken when a call asks to pass through the circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Circuit closed; the call proceeds with its full retry budget
    Allowed,
    /// Cooldown elapsed; this call is the single recovery probe
    Probe,
    /// Fail fast without touching the network
    Rejected { retry_in: Duration },
}

/// Per-endpoint failure record.
///
/// Fields are private: the only way to change a circuit is through
/// [`admit`](Self::admit), [`record_success`](Self::record_success),
/// [`record_failure`](Self::record_failure) and
/// [`release_probe`](Self::release_probe).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CircuitState {
    failure_count: u32,
    last_failure: Option<Instant>,
    probe_in_flight: bool,
}

impl CircuitState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn last_failure(&self) -> Option<Instant> {
        self.last_failure
    }

    pub fn probe_in_flight(&self) -> bool {
        self.probe_in_flight
    }

    fn is_tripped(&self, policy: &CircuitPolicy) -> bool {
        self.failure_count > 0 && self.failure_count >= policy.failure_threshold
    }

    /// Time left before the cooldown elapses, if the circuit is tripped.
    fn cooldown_remaining(&self, policy: &CircuitPolicy, now: Instant) -> Option<Duration> {
        if !self.is_tripped(policy) {
            return None;
        }
        let last = self.last_failure?;
        let elapsed = now.saturating_duration_since(last);
        policy.reset_timeout.checked_sub(elapsed).filter(|d| !d.is_zero())
    }

    pub fn status(&self, policy: &CircuitPolicy, now: Instant) -> CircuitStatus {
        if !self.is_tripped(policy) {
            CircuitStatus::Closed
        } else if self.cooldown_remaining(policy, now).is_some() {
            CircuitStatus::Open
        } else {
            CircuitStatus::HalfOpen
        }
    }

    /// Decide whether a call may proceed.
    ///
    /// In half-open state the first caller claims the probe; everyone else
    /// is rejected until the probe settles, however long the probe takes.
    pub fn admit(&mut self, policy: &CircuitPolicy, now: Instant) -> Admission {
        match self.status(policy, now) {
            CircuitStatus::Closed => Admission::Allowed,
            CircuitStatus::Open => Admission::Rejected {
                retry_in: self.cooldown_remaining(policy, now).unwrap_or_default(),
            },
            CircuitStatus::HalfOpen => {
                if self.probe_in_flight {
                    // A failing probe reopens the circuit for a full cooldown
                    return Admission::Rejected {
                        retry_in: policy.reset_timeout,
                    };
                }
                self.probe_in_flight = true;
                Admission::Probe
            }
        }
    }

    /// A call succeeded: close the circuit.
    pub fn record_success(&mut self) {
        self.failure_count = 0;
        self.last_failure = None;
        self.probe_in_flight = false;
    }

    /// A call failed after exhausting its budget. Returns the new status.
    pub fn record_failure(&mut self, policy: &CircuitPolicy, now: Instant) -> CircuitStatus {
        self.failure_count = self.failure_count.saturating_add(1);
        self.last_failure = Some(now);
        self.probe_in_flight = false;
        self.status(policy, now)
    }

    /// Give up a claimed probe without an outcome (cache hit, cancellation).
    pub fn release_probe(&mut self) {
        self.probe_in_flight = false;
    }
}

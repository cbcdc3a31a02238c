//! Domain error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid case: {0}")]
    InvalidCase(String),

    #[error("Unknown specialist: {0}")]
    UnknownSpecialist(String),

    #[error("Invalid panel: {0}")]
    InvalidPanel(String),
}

/// Classification of every failure the consultation pipeline can observe.
///
/// Used to tag propagated errors and as the label on failure metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Cache store unreachable; degraded to a miss, never fatal
    CacheUnavailable,
    /// Endpoint rejected by its circuit breaker without a network call
    CircuitOpen,
    /// Retry-eligible remote failure that exhausted the attempt budget
    TransientRemote,
    /// Remote failure that must not be retried
    PermanentRemote,
    /// Specialist invocation downgraded to a placeholder
    SpecialistFailed,
    /// Synthesis call failed; the whole diagnosis fails
    AggregationFailed,
    /// Caller cancelled before the work could complete
    Cancelled,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::CacheUnavailable => "cache_unavailable",
            FailureKind::CircuitOpen => "circuit_open",
            FailureKind::TransientRemote => "transient_remote",
            FailureKind::PermanentRemote => "permanent_remote",
            FailureKind::SpecialistFailed => "specialist_failed",
            FailureKind::AggregationFailed => "aggregation_failed",
            FailureKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

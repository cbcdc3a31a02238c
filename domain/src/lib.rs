//! Domain layer for consilium
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Panel
//!
//! A fixed set of specialists is consulted in parallel about one clinical
//! case. A director then synthesizes every specialist result into the
//! final diagnosis.
//!
//! ## Resilience
//!
//! Remote calls are guarded by a per-endpoint circuit breaker, a bounded
//! retry budget with exponential backoff, and a cache keyed by a digest of
//! the logical call. The policies here are pure; the application layer
//! drives them.

pub mod consultation;
pub mod core;
pub mod prompt;
pub mod resilience;

// Re-export commonly used types
pub use consultation::{
    Phase,
    panel::{DIRECTOR_TEMPERATURE, PanelConfig, SPECIALIST_TEMPERATURE, Seat},
    value_objects::{AggregateReport, SpecialistOutcome, SpecialistResult},
};
pub use core::{
    case::CaseRequest,
    endpoint::{DEFAULT_MODEL, Endpoint, ModelParams},
    error::{DomainError, FailureKind},
    specialist::Specialist,
};
pub use prompt::PromptTemplate;
pub use resilience::{
    cache_key::CacheKey,
    circuit::{Admission, CircuitPolicy, CircuitState, CircuitStatus},
    retry::RetryPolicy,
};

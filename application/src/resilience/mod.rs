//! Resilience layer
//!
//! - [`ResilienceState`] - circuits and cache shared by every client
//! - [`CircuitRegistry`] - per-endpoint circuit state behind fine-grained locks
//! - [`ResilientClient`] - circuit check, cache-aside and retry around one remote call

pub mod circuit_registry;
pub mod client;
pub mod state;

pub use circuit_registry::{CircuitRegistry, ProbeLease};
pub use client::{InvokeError, ResilientClient};
pub use state::ResilienceState;

//! Application-level configuration.
//!
//! - [`ResilienceParams`] - circuit, retry, cache and deadline settings for remote calls

pub mod resilience_params;

pub use resilience_params::ResilienceParams;

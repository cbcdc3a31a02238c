//! Resilience policies - pure state machines and schedules with no I/O.
//!
//! - [`circuit`] - per-endpoint circuit breaker state and admission decisions
//! - [`retry`] - attempt budget and exponential backoff schedule
//! - [`cache_key`] - deterministic digests identifying one logical remote call

pub mod cache_key;
pub mod circuit;
pub mod retry;

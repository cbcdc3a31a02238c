//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod cache_store;
pub mod metrics;
pub mod progress;
pub mod remote_endpoint;

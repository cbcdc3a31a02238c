//! Application layer for consilium
//!
//! This crate contains use cases, port definitions, the resilience layer
//! and application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod resilience;
pub mod use_cases;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::ResilienceParams;
pub use ports::{
    cache_store::{CacheError, CacheStore, NoCache},
    metrics::{MetricsRecorder, NoMetrics},
    progress::{NoProgress, ProgressNotifier},
    remote_endpoint::{
        Completion, CompletionRequest, ErrorClass, RemoteEndpoint, RemoteError, Usage,
    },
};
pub use resilience::{CircuitRegistry, InvokeError, ResilienceState, ResilientClient};
pub use use_cases::aggregate::AggregateUseCase;
pub use use_cases::diagnose::{DiagnoseError, DiagnoseUseCase};
pub use use_cases::dispatch_specialists::DispatchSpecialistsUseCase;

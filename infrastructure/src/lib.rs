//! Infrastructure layer for consilium
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod cache;
pub mod config;
pub mod metrics;
pub mod remote;

// Re-export commonly used types
pub use cache::MemoryCacheStore;
pub use config::{
    ConfigLoader, ConfigValidationError, FileCacheConfig, FileConfig, FileModelConfig,
    FilePanelConfig, FileRemoteConfig, FileResilienceConfig,
};
pub use metrics::PrometheusMetrics;
pub use remote::ChatCompletionsEndpoint;

//! Configuration file loading for consilium
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `CONSILIUM_<SECTION>__<KEY>` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./consilium.toml` or `./.consilium.toml`
//! 4. Global: `<config_dir>/consilium/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_BASE_URL, FileCacheConfig, FileConfig, FileModelConfig,
    FilePanelConfig, FileRemoteConfig, FileResilienceConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};

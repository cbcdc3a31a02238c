//! Remote endpoint configuration from TOML (`[remote]` section)

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default OpenAI-compatible base URL
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Raw remote endpoint configuration
///
/// # Example
///
/// ```toml
/// [remote]
/// base_url = "https://api.groq.com/openai/v1"
/// api_key_env = "GROQ_API_KEY"
/// connect_timeout_seconds = 10
/// call_timeout_seconds = 120
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRemoteConfig {
    /// Base URL every seat uses unless overridden in `[panel.endpoints]`
    pub base_url: String,
    /// Name of the environment variable holding the bearer token
    pub api_key_env: String,
    pub connect_timeout_seconds: u64,
    /// Deadline for one attempt, including reading the body
    pub call_timeout_seconds: u64,
}

impl Default for FileRemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            connect_timeout_seconds: 10,
            call_timeout_seconds: 120,
        }
    }
}

impl FileRemoteConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_seconds)
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into domain and
//! application types once validated.

mod cache;
mod model;
mod panel;
mod remote;
mod resilience;

pub use cache::FileCacheConfig;
pub use model::FileModelConfig;
pub use panel::FilePanelConfig;
pub use remote::{DEFAULT_BASE_URL, FileRemoteConfig};
pub use resilience::FileResilienceConfig;

use consilium_application::ResilienceParams;
use consilium_domain::{Endpoint, PanelConfig, Seat, Specialist};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A configuration value that cannot be used
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("{field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("{field}: unknown specialist '{value}'")]
    UnknownSpecialist { field: String, value: String },

    #[error("model.name: model name cannot be empty")]
    EmptyModelName,

    #[error("panel: {0}")]
    InvalidPanel(String),
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigValidationError {
    ConfigValidationError::InvalidValue {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Where remote calls go and how long they may take
    pub remote: FileRemoteConfig,
    /// Model name and sampling parameters
    pub model: FileModelConfig,
    /// Circuit breaker and retry settings
    pub resilience: FileResilienceConfig,
    /// Response cache settings
    pub cache: FileCacheConfig,
    /// Which specialists sit on the panel
    pub panel: FilePanelConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut issues = Vec::new();

        // 1. Remote
        if self.remote.base_url.trim().is_empty() {
            issues.push(invalid("remote.base_url", "must not be empty"));
        }
        if self.remote.connect_timeout_seconds == 0 {
            issues.push(invalid("remote.connect_timeout_seconds", "must be at least 1"));
        }
        if self.remote.call_timeout_seconds == 0 {
            issues.push(invalid("remote.call_timeout_seconds", "must be at least 1"));
        }

        // 2. Model
        if self.model.name.trim().is_empty() {
            issues.push(ConfigValidationError::EmptyModelName);
        }
        if self.model.max_tokens == 0 {
            issues.push(invalid("model.max_tokens", "must be at least 1"));
        }
        for (field, value) in [
            ("model.specialist_temperature", self.model.specialist_temperature),
            ("model.director_temperature", self.model.director_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                issues.push(invalid(field, format!("{} is outside 0.0..=2.0", value)));
            }
        }

        // 3. Resilience
        let r = &self.resilience;
        if r.failure_threshold == 0 {
            issues.push(invalid("resilience.failure_threshold", "must be at least 1"));
        }
        if r.max_attempts == 0 {
            issues.push(invalid("resilience.max_attempts", "must be at least 1"));
        }
        if r.backoff_min_seconds > r.backoff_max_seconds {
            issues.push(invalid(
                "resilience.backoff_min_seconds",
                format!(
                    "{} exceeds backoff_max_seconds ({})",
                    r.backoff_min_seconds, r.backoff_max_seconds
                ),
            ));
        }

        // 4. Cache
        if self.cache.enabled && self.cache.capacity == 0 {
            issues.push(invalid("cache.capacity", "must be at least 1 when enabled"));
        }
        if self.cache.timeout_ms == 0 {
            issues.push(invalid("cache.timeout_ms", "must be at least 1"));
        }

        // 5. Panel
        let (specialists, panel_issues) = self.panel.parse_specialists();
        issues.extend(panel_issues);
        if self.panel.specialists.is_empty() {
            issues.push(ConfigValidationError::InvalidPanel(
                "at least one specialist is required".to_string(),
            ));
        } else if let Err(e) = self.seat_panel(&specialists) {
            issues.push(ConfigValidationError::InvalidPanel(e.to_string()));
        }

        issues
    }

    /// Parameters for the resilient client
    pub fn to_resilience_params(&self) -> ResilienceParams {
        ResilienceParams::default()
            .with_circuit(self.resilience.circuit_policy())
            .with_retry(self.resilience.retry_policy())
            .with_cache_ttl(self.cache.ttl())
            .with_cache_timeout(self.cache.timeout())
            .with_call_timeout(self.remote.call_timeout())
    }

    /// Resolve the panel: one seat per configured specialist plus the director.
    pub fn to_panel_config(&self) -> Result<PanelConfig, ConfigValidationError> {
        let (specialists, mut issues) = self.panel.parse_specialists();
        if !issues.is_empty() {
            return Err(issues.remove(0));
        }
        self.seat_panel(&specialists)
            .map_err(|e| ConfigValidationError::InvalidPanel(e.to_string()))
    }

    fn seat_panel(
        &self,
        specialists: &[Specialist],
    ) -> Result<PanelConfig, consilium_domain::DomainError> {
        let seats = specialists
            .iter()
            .map(|&s| Seat::new(s, self.endpoint(s), self.model.specialist_params()))
            .collect();
        let director = Seat::new(
            Specialist::Director,
            self.endpoint(Specialist::Director),
            self.model.director_params(),
        );
        PanelConfig::new(seats, director)
    }

    fn endpoint(&self, specialist: Specialist) -> Endpoint {
        let base_url = self
            .panel
            .endpoint_for(specialist)
            .unwrap_or(&self.remote.base_url);
        Endpoint::new(specialist.as_str(), base_url.trim_end_matches('/'))
    }
}

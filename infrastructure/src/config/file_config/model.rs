//! Model parameters from TOML (`[model]` section)

use consilium_domain::{DEFAULT_MODEL, DIRECTOR_TEMPERATURE, ModelParams, SPECIALIST_TEMPERATURE};
use serde::{Deserialize, Serialize};

/// Raw model configuration
///
/// # Example
///
/// ```toml
/// [model]
/// name = "llama-3.3-70b-versatile"
/// max_tokens = 4096
/// specialist_temperature = 0.3
/// director_temperature = 0.2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    pub name: String,
    pub max_tokens: u32,
    pub specialist_temperature: f32,
    pub director_temperature: f32,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.to_string(),
            max_tokens: 4096,
            specialist_temperature: SPECIALIST_TEMPERATURE,
            director_temperature: DIRECTOR_TEMPERATURE,
        }
    }
}

impl FileModelConfig {
    pub fn specialist_params(&self) -> ModelParams {
        self.params(self.specialist_temperature)
    }

    pub fn director_params(&self) -> ModelParams {
        self.params(self.director_temperature)
    }

    fn params(&self, temperature: f32) -> ModelParams {
        ModelParams::default()
            .with_model(self.name.trim())
            .with_max_tokens(self.max_tokens)
            .with_temperature(temperature)
    }
}

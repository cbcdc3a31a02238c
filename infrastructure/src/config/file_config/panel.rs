//! Panel composition from TOML (`[panel]` section)

use super::ConfigValidationError;
use consilium_domain::Specialist;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw panel configuration
///
/// # Example
///
/// ```toml
/// [panel]
/// specialists = ["general", "retina", "neuro"]
/// director_endpoint = "http://localhost:8081/v1"
///
/// [panel.endpoints]
/// retina = "http://localhost:8082/v1"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePanelConfig {
    /// Specialists consulted for every case, by identifier
    pub specialists: Vec<String>,
    /// Per-specialist base URL overrides
    pub endpoints: BTreeMap<String, String>,
    /// Base URL override for the director
    pub director_endpoint: Option<String>,
}

impl Default for FilePanelConfig {
    fn default() -> Self {
        Self {
            specialists: Specialist::panel()
                .iter()
                .map(|s| s.as_str().to_string())
                .collect(),
            endpoints: BTreeMap::new(),
            director_endpoint: None,
        }
    }
}

impl FilePanelConfig {
    /// Resolve the specialist names, collecting every unknown one.
    pub fn parse_specialists(&self) -> (Vec<Specialist>, Vec<ConfigValidationError>) {
        let mut specialists = Vec::new();
        let mut issues = Vec::new();

        for name in &self.specialists {
            match name.parse::<Specialist>() {
                Ok(Specialist::Director) => issues.push(ConfigValidationError::InvalidPanel(
                    "the director cannot sit as a specialist".to_string(),
                )),
                Ok(specialist) => specialists.push(specialist),
                Err(_) => issues.push(ConfigValidationError::UnknownSpecialist {
                    field: "panel.specialists".to_string(),
                    value: name.clone(),
                }),
            }
        }

        for name in self.endpoints.keys() {
            if name.parse::<Specialist>().is_err() {
                issues.push(ConfigValidationError::UnknownSpecialist {
                    field: "panel.endpoints".to_string(),
                    value: name.clone(),
                });
            }
        }

        (specialists, issues)
    }

    /// Base URL override for one specialist, matched case-insensitively.
    pub fn endpoint_for(&self, specialist: Specialist) -> Option<&str> {
        if specialist.is_director() {
            return self.director_endpoint.as_deref();
        }
        self.endpoints
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(specialist.as_str()))
            .map(|(_, url)| url.as_str())
    }
}

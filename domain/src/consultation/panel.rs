//! Panel configuration - which specialists sit and where each is reached

use crate::core::endpoint::{Endpoint, ModelParams};
use crate::core::error::DomainError;
use crate::core::specialist::Specialist;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Temperature used by specialist seats unless configured otherwise
pub const SPECIALIST_TEMPERATURE: f32 = 0.3;
/// Temperature used by the director seat unless configured otherwise
pub const DIRECTOR_TEMPERATURE: f32 = 0.2;

/// One seat on the panel: a specialist bound to its endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub specialist: Specialist,
    pub endpoint: Endpoint,
    pub params: ModelParams,
}

impl Seat {
    pub fn new(specialist: Specialist, endpoint: Endpoint, params: ModelParams) -> Self {
        Self {
            specialist,
            endpoint,
            params,
        }
    }
}

/// The fixed specialist → endpoint mapping used for every diagnosis.
///
/// Resolved once at startup and validated before any request is served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    specialists: Vec<Seat>,
    director: Seat,
}

impl PanelConfig {
    pub fn new(specialists: Vec<Seat>, director: Seat) -> Result<Self, DomainError> {
        let panel = Self {
            specialists,
            director,
        };
        panel.validate()?;
        Ok(panel)
    }

    /// Standard four-specialist panel with every seat pointed at one base URL.
    pub fn standard(base_url: &str, params: &ModelParams) -> Self {
        let seat = |specialist: Specialist, temperature: f32| {
            Seat::new(
                specialist,
                Endpoint::new(specialist.as_str(), base_url),
                params.clone().with_temperature(temperature),
            )
        };

        Self {
            specialists: Specialist::panel()
                .into_iter()
                .map(|s| seat(s, SPECIALIST_TEMPERATURE))
                .collect(),
            director: seat(Specialist::Director, DIRECTOR_TEMPERATURE),
        }
    }

    fn validate(&self) -> Result<(), DomainError> {
        if self.specialists.is_empty() {
            return Err(DomainError::InvalidPanel(
                "at least one specialist is required".to_string(),
            ));
        }

        if !self.director.specialist.is_director() {
            return Err(DomainError::InvalidPanel(format!(
                "director seat is held by {}",
                self.director.specialist
            )));
        }

        let mut seen = HashSet::new();
        for seat in &self.specialists {
            if seat.specialist.is_director() {
                return Err(DomainError::InvalidPanel(
                    "the director cannot also sit as a specialist".to_string(),
                ));
            }
            if !seen.insert(seat.specialist) {
                return Err(DomainError::InvalidPanel(format!(
                    "duplicate specialist: {}",
                    seat.specialist
                )));
            }
        }

        Ok(())
    }

    pub fn specialists(&self) -> &[Seat] {
        &self.specialists
    }

    pub fn director(&self) -> &Seat {
        &self.director
    }

    /// Keep only the listed specialists (order follows the panel).
    pub fn restricted_to(&self, keep: &[Specialist]) -> Result<Self, DomainError> {
        let specialists = self
            .specialists
            .iter()
            .filter(|seat| keep.contains(&seat.specialist))
            .cloned()
            .collect();
        Self::new(specialists, self.director.clone())
    }
}

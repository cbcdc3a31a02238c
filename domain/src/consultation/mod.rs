//! Consultation domain - the panel, its phases, and what a diagnosis produces.

pub mod panel;
pub mod value_objects;

use serde::{Deserialize, Serialize};

/// Phase of a diagnosis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// All specialists are consulted in parallel
    Consultation,
    /// The director synthesizes every specialist result
    Synthesis,
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Consultation => "consultation",
            Phase::Synthesis => "synthesis",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Phase::Consultation => "Specialist Consultation",
            Phase::Synthesis => "Director Synthesis",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

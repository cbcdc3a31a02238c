//! Case request value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A clinical case submitted to the panel (Value Object)
///
/// Immutable once built: the identifier and the history text travel
/// together through one diagnosis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRequest {
    id: String,
    history: String,
}

impl CaseRequest {
    /// Create a new case, rejecting an empty identifier or history.
    pub fn try_new(id: impl Into<String>, history: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        let history = history.into();

        if id.trim().is_empty() {
            return Err(DomainError::InvalidCase("case id cannot be empty".to_string()));
        }
        if history.trim().is_empty() {
            return Err(DomainError::InvalidCase(
                "clinical history cannot be empty".to_string(),
            ));
        }

        Ok(Self { id, history })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The clinical history text
    pub fn history(&self) -> &str {
        &self.history
    }
}

impl std::fmt::Display for CaseRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "case {}", self.id)
    }
}

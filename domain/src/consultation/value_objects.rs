//! Consultation value objects - immutable result types of one diagnosis.
//!
//! - [`SpecialistResult`] - one specialist's report, or a placeholder when the call failed
//! - [`AggregateReport`] - the complete, fully built output of a diagnosis

use crate::core::case::CaseRequest;
use crate::core::error::FailureKind;
use crate::core::specialist::Specialist;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// What came back from one specialist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SpecialistOutcome {
    Report { text: String },
    Placeholder { kind: FailureKind, message: String },
}

/// Result for a single specialist, produced once per specialist per case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialistResult {
    pub specialist: Specialist,
    pub outcome: SpecialistOutcome,
}

impl SpecialistResult {
    pub fn report(specialist: Specialist, text: impl Into<String>) -> Self {
        Self {
            specialist,
            outcome: SpecialistOutcome::Report { text: text.into() },
        }
    }

    /// Stand-in for a specialist whose call ultimately failed.
    pub fn placeholder(specialist: Specialist, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            specialist,
            outcome: SpecialistOutcome::Placeholder {
                kind,
                message: message.into(),
            },
        }
    }

    pub fn is_report(&self) -> bool {
        matches!(self.outcome, SpecialistOutcome::Report { .. })
    }

    /// Text forwarded to the director: the report, or the failure notice.
    pub fn text(&self) -> String {
        match &self.outcome {
            SpecialistOutcome::Report { text } => text.clone(),
            SpecialistOutcome::Placeholder { message, .. } => {
                format!("Error consulting specialist: {}", message)
            }
        }
    }
}

/// Complete result of one diagnosis.
///
/// Only [`AggregateReport::new`] builds one, and it needs every piece:
/// the settled specialist results, the synthesis and the measured latency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    case_id: String,
    history: String,
    results: BTreeMap<Specialist, SpecialistResult>,
    synthesis: String,
    latency_ms: f64,
    completed_at: DateTime<Utc>,
}

impl AggregateReport {
    pub fn new(
        case: &CaseRequest,
        results: BTreeMap<Specialist, SpecialistResult>,
        synthesis: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self {
            case_id: case.id().to_string(),
            history: case.history().to_string(),
            results,
            synthesis: synthesis.into(),
            latency_ms: latency.as_secs_f64() * 1000.0,
            completed_at: Utc::now(),
        }
    }

    pub fn case_id(&self) -> &str {
        &self.case_id
    }

    pub fn history(&self) -> &str {
        &self.history
    }

    pub fn results(&self) -> &BTreeMap<Specialist, SpecialistResult> {
        &self.results
    }

    pub fn result(&self, specialist: Specialist) -> Option<&SpecialistResult> {
        self.results.get(&specialist)
    }

    pub fn synthesis(&self) -> &str {
        &self.synthesis
    }

    pub fn latency(&self) -> Duration {
        Duration::from_secs_f64(self.latency_ms / 1000.0)
    }

    pub fn latency_ms(&self) -> f64 {
        self.latency_ms
    }

    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Specialists whose reports were replaced by placeholders
    pub fn failed_specialists(&self) -> impl Iterator<Item = &SpecialistResult> {
        self.results.values().filter(|r| !r.is_report())
    }
}

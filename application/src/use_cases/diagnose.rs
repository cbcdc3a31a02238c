//! Diagnose use case
//!
//! Orchestrates one full diagnosis: parallel consultation, join barrier,
//! then the director synthesis.

use super::aggregate::AggregateUseCase;
use super::dispatch_specialists::DispatchSpecialistsUseCase;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::remote_endpoint::RemoteEndpoint;
use crate::resilience::{InvokeError, ResilientClient};
use consilium_domain::{AggregateReport, CaseRequest, FailureKind, PanelConfig, Phase};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that can occur during a diagnosis
#[derive(Error, Debug)]
pub enum DiagnoseError {
    #[error("Aggregation failed: {0}")]
    AggregationFailed(#[source] InvokeError),

    #[error("Diagnosis cancelled")]
    Cancelled,
}

impl DiagnoseError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DiagnoseError::AggregationFailed(_) => FailureKind::AggregationFailed,
            DiagnoseError::Cancelled => FailureKind::Cancelled,
        }
    }
}

/// Use case for running a diagnosis against a fixed panel
///
/// Stateless across calls apart from the circuits and cache shared through
/// the client, so one instance may serve concurrent diagnoses.
pub struct DiagnoseUseCase<R: RemoteEndpoint + 'static> {
    client: ResilientClient<R>,
    panel: PanelConfig,
    dispatch: DispatchSpecialistsUseCase<R>,
    aggregate: AggregateUseCase<R>,
}

impl<R: RemoteEndpoint + 'static> DiagnoseUseCase<R> {
    pub fn new(client: ResilientClient<R>, panel: PanelConfig) -> Self {
        Self {
            dispatch: DispatchSpecialistsUseCase::new(client.clone()),
            aggregate: AggregateUseCase::new(client.clone()),
            client,
            panel,
        }
    }

    pub fn panel(&self) -> &PanelConfig {
        &self.panel
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, case: &CaseRequest) -> Result<AggregateReport, DiagnoseError> {
        self.execute_with(case, &NoProgress, &CancellationToken::new())
            .await
    }

    /// Execute the use case with progress callbacks and cancellation
    pub async fn execute_with(
        &self,
        case: &CaseRequest,
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<AggregateReport, DiagnoseError> {
        let metrics = self.client.metrics();
        metrics.record_request();
        let started = tokio::time::Instant::now();

        info!(
            "Starting diagnosis {} with {} specialists",
            case.id(),
            self.panel.specialists().len()
        );

        // Phase 1: Consultation (returns only once every seat has settled)
        let results = self
            .dispatch
            .execute_with(case, self.panel.specialists(), progress, cancel)
            .await;

        // Phase 2: Synthesis
        info!("Phase 2: Synthesis");
        progress.on_phase_start(&Phase::Synthesis, 1);
        let director = self.panel.director();
        let synthesis = self
            .aggregate
            .execute(case, director, results.values(), cancel)
            .await;
        progress.on_specialist_complete(&Phase::Synthesis, director.specialist, synthesis.is_ok());
        progress.on_phase_complete(&Phase::Synthesis);

        let synthesis = match synthesis {
            Ok(text) => text,
            Err(InvokeError::Cancelled { .. }) => {
                warn!("Diagnosis {} cancelled before synthesis", case.id());
                metrics.record_failure(FailureKind::Cancelled);
                return Err(DiagnoseError::Cancelled);
            }
            Err(e) => {
                warn!("Diagnosis {} failed: {}", case.id(), e);
                metrics.record_failure(FailureKind::AggregationFailed);
                return Err(DiagnoseError::AggregationFailed(e));
            }
        };

        let latency = started.elapsed();
        metrics.record_success();
        metrics.observe_latency(latency);

        let report = AggregateReport::new(case, results, synthesis, latency);
        info!(
            "Diagnosis {} completed in {:.0}ms ({} specialist(s) unavailable)",
            case.id(),
            report.latency_ms(),
            report.failed_specialists().count()
        );
        Ok(report)
    }
}

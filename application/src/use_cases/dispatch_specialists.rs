//! Dispatch Specialists use case
//!
//! Fans one case out to every specialist seat concurrently and waits for
//! all of them to settle.

use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::remote_endpoint::{CompletionRequest, RemoteEndpoint};
use crate::resilience::ResilientClient;
use consilium_domain::{
    CaseRequest, FailureKind, Phase, PromptTemplate, Seat, Specialist, SpecialistResult,
};
use std::collections::BTreeMap;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Use case for consulting every specialist seat in parallel
pub struct DispatchSpecialistsUseCase<R: RemoteEndpoint + 'static> {
    client: ResilientClient<R>,
}

impl<R: RemoteEndpoint + 'static> DispatchSpecialistsUseCase<R> {
    pub fn new(client: ResilientClient<R>) -> Self {
        Self { client }
    }

    /// Consult every seat with no progress reporting or cancellation
    pub async fn execute(
        &self,
        case: &CaseRequest,
        seats: &[Seat],
    ) -> BTreeMap<Specialist, SpecialistResult> {
        self.execute_with(case, seats, &NoProgress, &CancellationToken::new())
            .await
    }

    /// Consult every seat.
    ///
    /// Every call is spawned before any is awaited. A failed call becomes a
    /// placeholder for that specialist; the returned map always holds one
    /// entry per seat.
    pub async fn execute_with(
        &self,
        case: &CaseRequest,
        seats: &[Seat],
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> BTreeMap<Specialist, SpecialistResult> {
        info!("Consulting {} specialists for case {}", seats.len(), case.id());
        progress.on_phase_start(&Phase::Consultation, seats.len());

        let mut join_set = JoinSet::new();

        for seat in seats {
            let client = self.client.clone();
            let cancel = cancel.clone();
            let seat = seat.clone();
            let request = CompletionRequest::new(
                PromptTemplate::specialist_prompt(seat.specialist, case.history()),
                seat.params.clone(),
            )
            .with_instructions(PromptTemplate::specialist_system(seat.specialist));

            join_set.spawn(async move {
                let result = client
                    .invoke_with_cancellation(&seat.endpoint, &request, &cancel)
                    .await;
                (seat.specialist, result)
            });
        }

        let mut results = BTreeMap::new();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((specialist, Ok(text))) => {
                    info!("Specialist {} responded successfully", specialist);
                    progress.on_specialist_complete(&Phase::Consultation, specialist, true);
                    results.insert(specialist, SpecialistResult::report(specialist, text));
                }
                Ok((specialist, Err(e))) => {
                    warn!("Specialist {} failed: {}", specialist, e);
                    self.client
                        .metrics()
                        .record_failure(FailureKind::SpecialistFailed);
                    progress.on_specialist_complete(&Phase::Consultation, specialist, false);
                    results.insert(
                        specialist,
                        SpecialistResult::placeholder(specialist, e.kind(), e.to_string()),
                    );
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        // A panicked task leaves its seat without an entry
        for seat in seats {
            results.entry(seat.specialist).or_insert_with(|| {
                self.client
                    .metrics()
                    .record_failure(FailureKind::SpecialistFailed);
                progress.on_specialist_complete(&Phase::Consultation, seat.specialist, false);
                SpecialistResult::placeholder(
                    seat.specialist,
                    FailureKind::SpecialistFailed,
                    "consultation task did not complete",
                )
            });
        }

        progress.on_phase_complete(&Phase::Consultation);
        results
    }
}

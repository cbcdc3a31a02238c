//! Aggregate use case
//!
//! One sequential call to the director with every specialist result bundled.

use crate::ports::remote_endpoint::{CompletionRequest, RemoteEndpoint};
use crate::resilience::{InvokeError, ResilientClient};
use consilium_domain::{CaseRequest, PromptTemplate, Seat, SpecialistResult};
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct AggregateUseCase<R: RemoteEndpoint + 'static> {
    client: ResilientClient<R>,
}

impl<R: RemoteEndpoint + 'static> AggregateUseCase<R> {
    pub fn new(client: ResilientClient<R>) -> Self {
        Self { client }
    }

    /// Build the director request from the case and all settled results.
    pub fn build_request<'a>(
        case: &CaseRequest,
        director: &Seat,
        results: impl IntoIterator<Item = &'a SpecialistResult>,
    ) -> CompletionRequest {
        CompletionRequest::new(
            PromptTemplate::director_prompt(case.history(), results),
            director.params.clone(),
        )
        .with_instructions(PromptTemplate::director_system())
    }

    /// Ask the director for the synthesis.
    ///
    /// Failures are returned unchanged; no synthesis text is fabricated.
    pub async fn execute<'a>(
        &self,
        case: &CaseRequest,
        director: &Seat,
        results: impl IntoIterator<Item = &'a SpecialistResult>,
        cancel: &CancellationToken,
    ) -> Result<String, InvokeError> {
        info!("Requesting synthesis from {}", director.endpoint);
        let request = Self::build_request(case, director, results);
        self.client
            .invoke_with_cancellation(&director.endpoint, &request, cancel)
            .await
    }
}

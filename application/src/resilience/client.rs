//! Resilient client - one guarded call to one remote endpoint.
//!
//! Pipeline per invocation:
//!
//! 1. **Circuit check** - an open circuit fails fast with no network call
//! 2. **Cache check** - a live entry is returned as-is
//! 3. **Attempts** - transient failures are retried with exponential backoff
//! 4. **Success** - the circuit closes and the text is written through to the cache
//! 5. **Final failure** - the circuit records one failure and a classified error is returned

use super::state::ResilienceState;
use crate::config::ResilienceParams;
use crate::ports::metrics::{MetricsRecorder, NoMetrics};
use crate::ports::remote_endpoint::{Completion, CompletionRequest, RemoteEndpoint, RemoteError};
use consilium_domain::{Admission, CacheKey, Endpoint, FailureKind, RetryPolicy};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors surfaced by [`ResilientClient::invoke`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("Circuit open for {endpoint}; retry in {retry_in:?}")]
    CircuitOpen { endpoint: String, retry_in: Duration },

    #[error("{endpoint} failed after {attempts} attempt(s): {source}")]
    Transient {
        endpoint: String,
        attempts: u32,
        #[source]
        source: RemoteError,
    },

    #[error("{endpoint} failed permanently: {source}")]
    Permanent {
        endpoint: String,
        #[source]
        source: RemoteError,
    },

    #[error("Call to {endpoint} cancelled before any attempt")]
    Cancelled { endpoint: String },
}

impl InvokeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            InvokeError::CircuitOpen { .. } => FailureKind::CircuitOpen,
            InvokeError::Transient { .. } => FailureKind::TransientRemote,
            InvokeError::Permanent { .. } => FailureKind::PermanentRemote,
            InvokeError::Cancelled { .. } => FailureKind::Cancelled,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            InvokeError::CircuitOpen { endpoint, .. }
            | InvokeError::Transient { endpoint, .. }
            | InvokeError::Permanent { endpoint, .. }
            | InvokeError::Cancelled { endpoint } => endpoint,
        }
    }
}

fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

/// Wraps an injectable [`RemoteEndpoint`] with circuit breaking, caching
/// and retries.
///
/// Cheap to clone: every clone shares the same remote, state and metrics.
pub struct ResilientClient<R: RemoteEndpoint + 'static> {
    remote: Arc<R>,
    state: Arc<ResilienceState>,
    metrics: Arc<dyn MetricsRecorder>,
    params: ResilienceParams,
}

impl<R: RemoteEndpoint + 'static> Clone for ResilientClient<R> {
    fn clone(&self) -> Self {
        Self {
            remote: Arc::clone(&self.remote),
            state: Arc::clone(&self.state),
            metrics: Arc::clone(&self.metrics),
            params: self.params,
        }
    }
}

impl<R: RemoteEndpoint + 'static> ResilientClient<R> {
    pub fn new(remote: Arc<R>, state: Arc<ResilienceState>, params: ResilienceParams) -> Self {
        Self {
            remote,
            state,
            metrics: Arc::new(NoMetrics),
            params,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn params(&self) -> &ResilienceParams {
        &self.params
    }

    pub fn state(&self) -> &Arc<ResilienceState> {
        &self.state
    }

    pub fn metrics(&self) -> &Arc<dyn MetricsRecorder> {
        &self.metrics
    }

    /// Invoke the endpoint with no cancellation
    pub async fn invoke(
        &self,
        endpoint: &Endpoint,
        request: &CompletionRequest,
    ) -> Result<String, InvokeError> {
        self.invoke_with_cancellation(endpoint, request, &CancellationToken::new())
            .await
    }

    /// Invoke the endpoint; cancelling `cancel` stops further attempts
    /// but never interrupts one already in flight.
    pub async fn invoke_with_cancellation(
        &self,
        endpoint: &Endpoint,
        request: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<String, InvokeError> {
        let id = endpoint.id();
        let circuits = self.state.circuits();

        // Held across the await points below; a dropped future drops it too
        let (retry, probe) = match circuits.admit(id, now()) {
            Admission::Allowed => (self.params.retry, None),
            Admission::Probe => (
                RetryPolicy {
                    max_attempts: 1,
                    ..self.params.retry
                },
                Some(circuits.lease_probe(id)),
            ),
            Admission::Rejected { retry_in } => {
                debug!("Rejecting call to {}: circuit open", id);
                self.metrics.record_failure(FailureKind::CircuitOpen);
                return Err(InvokeError::CircuitOpen {
                    endpoint: id.to_string(),
                    retry_in,
                });
            }
        };

        let key = CacheKey::derive(
            endpoint,
            request.instructions.as_deref(),
            &request.payload,
            &request.params,
        );

        // A cache hit drops an unsettled probe lease, releasing the slot
        if let Some(text) = self.cache_lookup(&key).await {
            return Ok(text);
        }

        match self.call_with_retry(endpoint, request, retry, cancel).await {
            Ok(completion) => {
                match probe {
                    Some(lease) => lease.succeed(),
                    None => circuits.record_success(id),
                }
                self.cache_store(&key, &completion.text).await;
                Ok(completion.text)
            }
            Err(error) => {
                if !matches!(error, InvokeError::Cancelled { .. }) {
                    match probe {
                        Some(lease) => {
                            lease.fail(now());
                        }
                        None => {
                            circuits.record_failure(id, now());
                        }
                    }
                }
                self.metrics.record_failure(error.kind());
                Err(error)
            }
        }
    }

    async fn call_with_retry(
        &self,
        endpoint: &Endpoint,
        request: &CompletionRequest,
        retry: RetryPolicy,
        cancel: &CancellationToken,
    ) -> Result<Completion, InvokeError> {
        let mut attempts = 0u32;
        let mut last_error: Option<RemoteError> = None;

        loop {
            if cancel.is_cancelled() {
                return Err(match last_error {
                    Some(source) => InvokeError::Transient {
                        endpoint: endpoint.id().to_string(),
                        attempts,
                        source,
                    },
                    None => InvokeError::Cancelled {
                        endpoint: endpoint.id().to_string(),
                    },
                });
            }

            attempts += 1;
            let started = tokio::time::Instant::now();

            match self.attempt(endpoint, request).await {
                Ok(completion) => {
                    info!(
                        endpoint = endpoint.id(),
                        attempt = attempts,
                        duration_ms = started.elapsed().as_millis() as u64,
                        tokens = completion.usage.map(|u| u.total_tokens),
                        "Remote call succeeded"
                    );
                    return Ok(completion);
                }
                Err(source) if !source.is_transient() => {
                    warn!("Permanent failure from {}: {}", endpoint, source);
                    return Err(InvokeError::Permanent {
                        endpoint: endpoint.id().to_string(),
                        source,
                    });
                }
                Err(source) if !retry.allows_another(attempts) => {
                    warn!(
                        "Giving up on {} after {} attempt(s): {}",
                        endpoint, attempts, source
                    );
                    return Err(InvokeError::Transient {
                        endpoint: endpoint.id().to_string(),
                        attempts,
                        source,
                    });
                }
                Err(source) => {
                    let delay = retry.delay_after(attempts);
                    warn!(
                        "Attempt {}/{} to {} failed: {}; retrying in {:?}",
                        attempts, retry.max_attempts, endpoint, source, delay
                    );
                    last_error = Some(source);

                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        _ = cancel.cancelled() => {}
                    }
                }
            }
        }
    }

    /// One network attempt bounded by the call deadline.
    async fn attempt(
        &self,
        endpoint: &Endpoint,
        request: &CompletionRequest,
    ) -> Result<Completion, RemoteError> {
        let deadline = self.params.call_timeout;
        match tokio::time::timeout(deadline, self.remote.complete(endpoint, request)).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(deadline)),
        }
    }

    async fn cache_lookup(&self, key: &CacheKey) -> Option<String> {
        let timeout = self.params.cache_timeout;
        match tokio::time::timeout(timeout, self.state.cache().get(key)).await {
            Ok(Ok(Some(text))) => {
                debug!("Cache hit for {}", key);
                self.metrics.record_cache_hit();
                Some(text)
            }
            Ok(Ok(None)) => None,
            Ok(Err(e)) => {
                warn!("Cache read failed, treating as miss: {}", e);
                self.metrics.record_failure(FailureKind::CacheUnavailable);
                None
            }
            Err(_) => {
                warn!("Cache read timed out after {:?}, treating as miss", timeout);
                self.metrics.record_failure(FailureKind::CacheUnavailable);
                None
            }
        }
    }

    async fn cache_store(&self, key: &CacheKey, text: &str) {
        let timeout = self.params.cache_timeout;
        let write = self.state.cache().set(key, text, self.params.cache_ttl);
        match tokio::time::timeout(timeout, write).await {
            Ok(Ok(())) => debug!("Cached response under {}", key),
            Ok(Err(e)) => {
                warn!("Cache write failed: {}", e);
                self.metrics.record_failure(FailureKind::CacheUnavailable);
            }
            Err(_) => {
                warn!("Cache write timed out after {:?}", timeout);
                self.metrics.record_failure(FailureKind::CacheUnavailable);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        FailingCache, HangingCache, MapCache, RecordingMetrics, Reply, ScriptedRemote,
    };
    use consilium_domain::{CircuitPolicy, ModelParams};

    fn endpoint(id: &str) -> Endpoint {
        Endpoint::new(id, "http://remote.test")
    }

    fn request(payload: &str) -> CompletionRequest {
        CompletionRequest::new(payload, ModelParams::default()).with_instructions("system")
    }

    struct Harness {
        remote: Arc<ScriptedRemote>,
        cache: Arc<MapCache>,
        metrics: Arc<RecordingMetrics>,
        client: ResilientClient<ScriptedRemote>,
    }

    fn harness(params: ResilienceParams) -> Harness {
        let remote = Arc::new(ScriptedRemote::new());
        let cache = Arc::new(MapCache::default());
        let metrics = Arc::new(RecordingMetrics::default());
        let state = Arc::new(ResilienceState::new(params.circuit, cache.clone()));
        let client = ResilientClient::new(Arc::clone(&remote), state, params)
            .with_metrics(metrics.clone());
        Harness {
            remote,
            cache,
            metrics,
            client,
        }
    }

    fn failure_count(h: &Harness, id: &str) -> u32 {
        h.client
            .state()
            .circuits()
            .snapshot(id)
            .map(|s| s.failure_count())
            .unwrap_or(0)
    }

    // ==================== Cache ====================

    #[tokio::test(start_paused = true)]
    async fn test_success_is_written_through_and_served_from_cache() {
        let h = harness(ResilienceParams::default());
        h.remote.always("retina", Reply::text("macula is fine"));

        let first = h.client.invoke(&endpoint("retina"), &request("case")).await.unwrap();
        let second = h.client.invoke(&endpoint("retina"), &request("case")).await.unwrap();

        assert_eq!(first, "macula is fine");
        assert_eq!(second, first);
        assert_eq!(h.remote.total_calls(), 1);
        assert_eq!(h.cache.ttls(), vec![Duration::from_secs(86_400)]);
        assert_eq!(h.metrics.cache_hits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prepopulated_cache_skips_network() {
        let h = harness(ResilienceParams::default());
        let req = CompletionRequest::new("payloadX", ModelParams::default());
        let key = CacheKey::derive(&endpoint("endpointA"), None, "payloadX", &req.params);
        h.cache.insert(key, "stored text");

        let text = h.client.invoke(&endpoint("endpointA"), &req).await.unwrap();

        assert_eq!(text, "stored text");
        assert_eq!(h.remote.total_calls(), 0);
        assert!(h.client.state().circuits().snapshot("endpointA").unwrap().failure_count() == 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_cache_degrades_to_miss() {
        let remote = Arc::new(ScriptedRemote::new());
        let metrics = Arc::new(RecordingMetrics::default());
        let state = Arc::new(ResilienceState::new(
            CircuitPolicy::default(),
            Arc::new(FailingCache),
        ));
        let client = ResilientClient::new(Arc::clone(&remote), state, ResilienceParams::default())
            .with_metrics(metrics.clone());

        let text = client.invoke(&endpoint("cornea"), &request("case")).await.unwrap();

        assert_eq!(text, "cornea report");
        assert_eq!(remote.total_calls(), 1);
        assert_eq!(metrics.failures_of(FailureKind::CacheUnavailable), 2);
        assert_eq!(
            client.state().circuits().snapshot("cornea").unwrap().failure_count(),
            0
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_cache_is_bounded() {
        let remote = Arc::new(ScriptedRemote::new());
        let state = Arc::new(ResilienceState::new(
            CircuitPolicy::default(),
            Arc::new(HangingCache),
        ));
        let params = ResilienceParams::default().with_cache_timeout(Duration::from_millis(500));
        let client = ResilientClient::new(Arc::clone(&remote), state, params);

        let started = tokio::time::Instant::now();
        let text = client.invoke(&endpoint("neuro"), &request("case")).await.unwrap();

        assert_eq!(text, "neuro report");
        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }

    // ==================== Retry ====================

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried_with_backoff() {
        let h = harness(ResilienceParams::default());
        h.remote.then("general", Reply::transient());
        h.remote.then("general", Reply::transient());
        h.remote.then("general", Reply::text("recovered"));

        let started = tokio::time::Instant::now();
        let text = h.client.invoke(&endpoint("general"), &request("case")).await.unwrap();

        assert_eq!(text, "recovered");
        assert_eq!(h.remote.call_count("general"), 3);
        assert_eq!(started.elapsed(), Duration::from_secs(2 + 4));
        assert_eq!(failure_count(&h, "general"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_count_one_failure() {
        let h = harness(ResilienceParams::default());
        h.remote.always("general", Reply::transient());

        let err = h.client.invoke(&endpoint("general"), &request("case")).await.unwrap_err();

        assert!(matches!(err, InvokeError::Transient { attempts: 5, .. }));
        assert_eq!(err.kind(), FailureKind::TransientRemote);
        assert_eq!(h.remote.call_count("general"), 5);
        assert_eq!(failure_count(&h, "general"), 1);
        assert_eq!(h.cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_failure_is_not_retried() {
        let h = harness(ResilienceParams::default());
        h.remote.always("cornea", Reply::permanent());

        let err = h.client.invoke(&endpoint("cornea"), &request("case")).await.unwrap_err();

        assert!(matches!(err, InvokeError::Permanent { .. }));
        assert_eq!(h.remote.call_count("cornea"), 1);
        assert_eq!(failure_count(&h, "cornea"), 1);
        assert_eq!(h.metrics.failures(), vec![FailureKind::PermanentRemote]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_bounded_and_delays_non_decreasing() {
        let retry = RetryPolicy {
            max_attempts: 8,
            ..RetryPolicy::default()
        };
        let h = harness(ResilienceParams::default().with_retry(retry));
        h.remote.always("neuro", Reply::transient());

        let _ = h.client.invoke(&endpoint("neuro"), &request("case")).await;

        let calls = h.remote.calls();
        assert_eq!(calls.len(), 8);
        let gaps: Vec<Duration> = calls.windows(2).map(|w| w[1].at - w[0].at).collect();
        for pair in gaps.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert!(gaps.iter().all(|g| *g <= Duration::from_secs(60)));
        assert_eq!(gaps.last().copied(), Some(Duration::from_secs(60)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_call_times_out_as_transient() {
        let params = ResilienceParams::default()
            .with_retry(RetryPolicy::single_attempt())
            .with_call_timeout(Duration::from_secs(120));
        let h = harness(params);
        h.remote.with_latency("director", Duration::from_secs(300));

        let err = h.client.invoke(&endpoint("director"), &request("case")).await.unwrap_err();

        assert_eq!(
            err,
            InvokeError::Transient {
                endpoint: "director".to_string(),
                attempts: 1,
                source: RemoteError::Timeout(Duration::from_secs(120)),
            }
        );
    }

    // ==================== Circuit breaker ====================

    #[tokio::test(start_paused = true)]
    async fn test_circuit_opens_after_threshold_and_fails_fast() {
        let h = harness(ResilienceParams::default());
        h.remote.always("retina", Reply::transient());

        for _ in 0..5 {
            let err = h.client.invoke(&endpoint("retina"), &request("case")).await.unwrap_err();
            assert!(matches!(err, InvokeError::Transient { .. }));
        }
        let calls_before = h.remote.total_calls();

        let err = h.client.invoke(&endpoint("retina"), &request("case")).await.unwrap_err();

        assert!(matches!(err, InvokeError::CircuitOpen { .. }));
        assert_eq!(h.remote.total_calls(), calls_before);
        assert_eq!(h.metrics.failures_of(FailureKind::CircuitOpen), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_circuit_does_not_serve_cache() {
        let params = ResilienceParams::default().with_circuit(CircuitPolicy {
            failure_threshold: 1,
            reset_timeout: Duration::from_secs(60),
        });
        let h = harness(params);
        let req = request("case");
        let key = CacheKey::derive(&endpoint("retina"), Some("system"), "case", &req.params);
        h.cache.insert(key, "cached");
        h.remote.always("retina", Reply::permanent());

        let _ = h.client.invoke(&endpoint("retina"), &request("other")).await;
        let err = h.client.invoke(&endpoint("retina"), &req).await.unwrap_err();

        assert!(matches!(err, InvokeError::CircuitOpen { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_open_allows_exactly_one_probe() {
        let h = harness(ResilienceParams::default());
        h.remote.always("retina", Reply::transient());
        for _ in 0..5 {
            let _ = h.client.invoke(&endpoint("retina"), &request("case")).await;
        }
        let calls_before = h.remote.total_calls();

        tokio::time::advance(Duration::from_secs(61)).await;
        let err = h.client.invoke(&endpoint("retina"), &request("case")).await.unwrap_err();

        assert!(matches!(err, InvokeError::Transient { attempts: 1, .. }));
        assert_eq!(h.remote.total_calls(), calls_before + 1);

        // Probe failed: the timestamp is refreshed and the circuit is open again
        let err = h.client.invoke(&endpoint("retina"), &request("case")).await.unwrap_err();
        assert!(matches!(err, InvokeError::CircuitOpen { .. }));
        assert_eq!(h.remote.total_calls(), calls_before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_probe_resets_counter() {
        let h = harness(ResilienceParams::default());
        h.remote.always("neuro", Reply::transient());
        for _ in 0..5 {
            let _ = h.client.invoke(&endpoint("neuro"), &request("case")).await;
        }
        assert_eq!(failure_count(&h, "neuro"), 5);

        tokio::time::advance(Duration::from_secs(61)).await;
        h.remote.always("neuro", Reply::text("back online"));

        let text = h.client.invoke(&endpoint("neuro"), &request("case")).await.unwrap();
        assert_eq!(text, "back online");
        assert_eq!(failure_count(&h, "neuro"), 0);

        let again = h.client.invoke(&endpoint("neuro"), &request("fresh")).await;
        assert!(again.is_ok());
    }

    async fn trip(h: &Harness, id: &str) {
        h.remote.always(id, Reply::transient());
        for _ in 0..5 {
            let _ = h.client.invoke(&endpoint(id), &request("case")).await;
        }
        assert_eq!(failure_count(h, id), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_recovery_call_blocks_concurrent_callers() {
        let h = harness(ResilienceParams::default());
        trip(&h, "retina").await;
        let calls_before = h.remote.total_calls();

        tokio::time::sleep(Duration::from_secs(61)).await;
        h.remote.always("retina", Reply::text("perfused"));
        h.remote.with_latency("retina", Duration::from_secs(90));

        let client = h.client.clone();
        let recovery = tokio::spawn(async move {
            client.invoke(&endpoint("retina"), &request("first")).await
        });

        // Past reset_timeout since the first caller started, still inside call_timeout
        tokio::time::sleep(Duration::from_secs(61)).await;
        let err = h.client.invoke(&endpoint("retina"), &request("other")).await.unwrap_err();

        assert!(matches!(err, InvokeError::CircuitOpen { .. }));
        assert_eq!(h.remote.total_calls(), calls_before + 1);

        assert_eq!(recovery.await.unwrap().unwrap(), "perfused");
        assert_eq!(failure_count(&h, "retina"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_recovery_call() {
        let h = harness(ResilienceParams::default());
        trip(&h, "cornea").await;
        let calls_before = h.remote.total_calls();

        tokio::time::sleep(Duration::from_secs(61)).await;
        h.remote.always("cornea", Reply::text("clear"));
        h.remote.with_latency("cornea", Duration::from_secs(5));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let client = h.client.clone();
                tokio::spawn(async move {
                    client
                        .invoke(&endpoint("cornea"), &request(&format!("case {}", i)))
                        .await
                })
            })
            .collect();

        let mut admitted = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => admitted += 1,
                Err(InvokeError::CircuitOpen { .. }) => rejected += 1,
                Err(other) => panic!("unexpected error: {}", other),
            }
        }

        assert_eq!((admitted, rejected), (1, 3));
        assert_eq!(h.remote.total_calls(), calls_before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_recovery_call_frees_the_slot() {
        let h = harness(ResilienceParams::default());
        trip(&h, "neuro").await;

        tokio::time::sleep(Duration::from_secs(61)).await;
        h.remote.always("neuro", Reply::text("stable"));
        h.remote.with_latency("neuro", Duration::from_secs(30));

        let client = h.client.clone();
        let recovery = tokio::spawn(async move {
            client.invoke(&endpoint("neuro"), &request("case")).await
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(h.client.state().circuits().snapshot("neuro").unwrap().probe_in_flight());

        recovery.abort();
        assert!(recovery.await.unwrap_err().is_cancelled());

        let snapshot = h.client.state().circuits().snapshot("neuro").unwrap();
        assert!(!snapshot.probe_in_flight());
        assert_eq!(snapshot.failure_count(), 5);

        let text = h.client.invoke(&endpoint("neuro"), &request("case")).await.unwrap();
        assert_eq!(text, "stable");
        assert_eq!(failure_count(&h, "neuro"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_circuits_are_per_endpoint() {
        let params = ResilienceParams::default().with_circuit(CircuitPolicy {
            failure_threshold: 1,
            reset_timeout: Duration::from_secs(60),
        });
        let h = harness(params);
        h.remote.always("cornea", Reply::permanent());

        let _ = h.client.invoke(&endpoint("cornea"), &request("case")).await;

        assert!(matches!(
            h.client.invoke(&endpoint("cornea"), &request("case")).await,
            Err(InvokeError::CircuitOpen { .. })
        ));
        assert!(h.client.invoke(&endpoint("general"), &request("case")).await.is_ok());
    }

    // ==================== Cancellation ====================

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_makes_no_call() {
        let h = harness(ResilienceParams::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = h
            .client
            .invoke_with_cancellation(&endpoint("general"), &request("case"), &cancel)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Cancelled);
        assert_eq!(h.remote.total_calls(), 0);
        assert_eq!(failure_count(&h, "general"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_further_retries() {
        let h = harness(ResilienceParams::default());
        h.remote.always("general", Reply::transient());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let err = h
            .client
            .invoke_with_cancellation(&endpoint("general"), &request("case"), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, InvokeError::Transient { attempts: 1, .. }));
        assert_eq!(h.remote.call_count("general"), 1);
        assert_eq!(failure_count(&h, "general"), 1);
    }
}

//! Test doubles shared by the application-layer tests.

use crate::ports::cache_store::{CacheError, CacheStore};
use crate::ports::metrics::MetricsRecorder;
use crate::ports::remote_endpoint::{Completion, CompletionRequest, RemoteEndpoint, RemoteError};
use async_trait::async_trait;
use consilium_domain::{CacheKey, Endpoint, FailureKind};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Text(String),
    Fail(RemoteError),
}

impl Reply {
    pub(crate) fn text(text: &str) -> Self {
        Reply::Text(text.to_string())
    }

    pub(crate) fn transient() -> Self {
        Reply::Fail(RemoteError::Upstream {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }

    pub(crate) fn permanent() -> Self {
        Reply::Fail(RemoteError::Unauthorized("invalid api key".to_string()))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub endpoint: String,
    pub request: CompletionRequest,
    pub at: Instant,
}

/// Remote endpoint whose replies are scripted per endpoint id.
///
/// Queued replies are consumed first; then the fallback applies; with
/// neither, the endpoint answers `"<id> report"`.
#[derive(Default)]
pub(crate) struct ScriptedRemote {
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    fallback: Mutex<HashMap<String, Reply>>,
    latency: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedRemote {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn always(&self, endpoint: &str, reply: Reply) {
        self.fallback
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), reply);
    }

    pub(crate) fn then(&self, endpoint: &str, reply: Reply) {
        self.queued
            .lock()
            .unwrap()
            .entry(endpoint.to_string())
            .or_default()
            .push_back(reply);
    }

    pub(crate) fn with_latency(&self, endpoint: &str, latency: Duration) {
        self.latency
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), latency);
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self, endpoint: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.endpoint == endpoint)
            .count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RemoteEndpoint for ScriptedRemote {
    async fn complete(
        &self,
        endpoint: &Endpoint,
        request: &CompletionRequest,
    ) -> Result<Completion, RemoteError> {
        let id = endpoint.id().to_string();
        self.calls.lock().unwrap().push(RecordedCall {
            endpoint: id.clone(),
            request: request.clone(),
            at: Instant::now(),
        });

        let latency = self.latency.lock().unwrap().get(&id).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(&id)
            .and_then(|q| q.pop_front());
        let reply = queued
            .or_else(|| self.fallback.lock().unwrap().get(&id).cloned())
            .unwrap_or_else(|| Reply::Text(format!("{} report", id)));

        match reply {
            Reply::Text(text) => Ok(Completion::new(text)),
            Reply::Fail(error) => Err(error),
        }
    }
}

/// Unbounded in-memory cache that records the TTLs it was given
#[derive(Default)]
pub(crate) struct MapCache {
    entries: Mutex<HashMap<CacheKey, String>>,
    ttls: Mutex<Vec<Duration>>,
}

impl MapCache {
    pub(crate) fn insert(&self, key: CacheKey, value: &str) {
        self.entries.lock().unwrap().insert(key, value.to_string());
    }

    pub(crate) fn get_now(&self, key: &CacheKey) -> Option<String> {
        self.entries.lock().unwrap().get(key).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub(crate) fn ttls(&self) -> Vec<Duration> {
        self.ttls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CacheStore for MapCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        Ok(self.get_now(key))
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.insert(key.clone(), value);
        self.ttls.lock().unwrap().push(ttl);
        Ok(())
    }
}

/// Cache whose backing store is unreachable
pub(crate) struct FailingCache;

#[async_trait]
impl CacheStore for FailingCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set(&self, _key: &CacheKey, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

/// Cache that never answers
pub(crate) struct HangingCache;

#[async_trait]
impl CacheStore for HangingCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<String>, CacheError> {
        std::future::pending().await
    }

    async fn set(&self, _key: &CacheKey, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        std::future::pending().await
    }
}

#[derive(Default)]
pub(crate) struct RecordingMetrics {
    pub requests: AtomicUsize,
    pub successes: AtomicUsize,
    pub cache_hits: AtomicUsize,
    failures: Mutex<Vec<FailureKind>>,
    latencies: Mutex<Vec<Duration>>,
}

impl RecordingMetrics {
    pub(crate) fn failures(&self) -> Vec<FailureKind> {
        self.failures.lock().unwrap().clone()
    }

    pub(crate) fn failures_of(&self, kind: FailureKind) -> usize {
        self.failures().into_iter().filter(|k| *k == kind).count()
    }

    pub(crate) fn latencies(&self) -> Vec<Duration> {
        self.latencies.lock().unwrap().clone()
    }
}

impl MetricsRecorder for RecordingMetrics {
    fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    fn record_failure(&self, kind: FailureKind) {
        self.failures.lock().unwrap().push(kind);
    }

    fn observe_latency(&self, latency: Duration) {
        self.latencies.lock().unwrap().push(latency);
    }

    fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::SeqCst);
    }
}

//! Metrics port
//!
//! Observability sink for request counts, failures by kind, and the
//! end-to-end latency histogram. Scraping or pushing is the adapter's job.

use consilium_domain::FailureKind;
use std::time::Duration;

pub trait MetricsRecorder: Send + Sync {
    /// A diagnosis request was received
    fn record_request(&self);

    /// A diagnosis completed with a full report
    fn record_success(&self);

    /// A failure of the given kind was observed (soft or hard)
    fn record_failure(&self, kind: FailureKind);

    /// End-to-end latency of a completed diagnosis
    fn observe_latency(&self, latency: Duration);

    /// A remote call was served from cache
    fn record_cache_hit(&self) {}
}

/// No-op recorder for when metrics are not collected
pub struct NoMetrics;

impl MetricsRecorder for NoMetrics {
    fn record_request(&self) {}
    fn record_success(&self) {}
    fn record_failure(&self, _kind: FailureKind) {}
    fn observe_latency(&self, _latency: Duration) {}
}

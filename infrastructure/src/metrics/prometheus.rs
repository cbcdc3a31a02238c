//! Prometheus metrics for diagnoses

use consilium_application::MetricsRecorder;
use consilium_domain::FailureKind;
use prometheus::{
    Encoder, Histogram, IntCounter, IntCounterVec, Registry, TextEncoder,
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry,
};
use std::time::Duration;

/// Latency buckets in seconds; a diagnosis takes seconds to minutes
const LATENCY_BUCKETS: [f64; 10] = [0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0, 300.0];

/// Diagnosis metrics backed by a private Prometheus registry
#[derive(Clone)]
pub struct PrometheusMetrics {
    pub diagnoses_total: IntCounter,
    pub diagnoses_succeeded_total: IntCounter,
    pub failures_total: IntCounterVec,
    pub cache_hits_total: IntCounter,
    pub diagnosis_latency_seconds: Histogram,

    registry: Registry,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let diagnoses_total = register_int_counter_with_registry!(
            "consilium_diagnoses_total",
            "Total number of diagnosis requests received",
            registry
        )?;

        let diagnoses_succeeded_total = register_int_counter_with_registry!(
            "consilium_diagnoses_succeeded_total",
            "Total number of diagnoses completed with a synthesis",
            registry
        )?;

        let failures_total = register_int_counter_vec_with_registry!(
            "consilium_failures_total",
            "Total number of failures by kind",
            &["kind"],
            registry
        )?;

        let cache_hits_total = register_int_counter_with_registry!(
            "consilium_cache_hits_total",
            "Total number of remote calls served from cache",
            registry
        )?;

        let diagnosis_latency_seconds = register_histogram_with_registry!(
            "consilium_diagnosis_latency_seconds",
            "End-to-end latency of completed diagnoses in seconds",
            LATENCY_BUCKETS.to_vec(),
            registry
        )?;

        Ok(Self {
            diagnoses_total,
            diagnoses_succeeded_total,
            failures_total,
            cache_hits_total,
            diagnosis_latency_seconds,
            registry,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Export metrics in the Prometheus text exposition format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl MetricsRecorder for PrometheusMetrics {
    fn record_request(&self) {
        self.diagnoses_total.inc();
    }

    fn record_success(&self) {
        self.diagnoses_succeeded_total.inc();
    }

    fn record_failure(&self, kind: FailureKind) {
        self.failures_total.with_label_values(&[kind.as_str()]).inc();
    }

    fn observe_latency(&self, latency: Duration) {
        self.diagnosis_latency_seconds.observe(latency.as_secs_f64());
    }

    fn record_cache_hit(&self) {
        self.cache_hits_total.inc();
    }
}

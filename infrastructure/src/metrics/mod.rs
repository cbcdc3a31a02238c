//! Metrics adapters

mod prometheus;

pub use self::prometheus::PrometheusMetrics;

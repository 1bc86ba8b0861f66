//! Prometheus metrics for the world simulation.
//!
//! All metrics follow the naming convention: `ws_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: decisions applied, rejections by reason, owner operations
//! - **Gauge**: current pause flag
//! - **Histogram**: decision application latency

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Decisions committed
    pub static ref DECISIONS_APPLIED: Counter = Counter::new(
        "ws_decisions_applied_total",
        "Total encrypted decisions aggregated into the world state"
    ).expect("metric creation failed");

    /// Decisions rejected, by reason
    pub static ref DECISIONS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("ws_decisions_rejected_total", "Total decisions rejected"),
        &["reason"]  // reason: contract_paused/not_authorized/invalid_proof/...
    ).expect("metric creation failed");

    /// Owner operations committed, by operation
    pub static ref ADMIN_OPERATIONS: CounterVec = CounterVec::new(
        Opts::new("ws_admin_operations_total", "Total owner operations committed"),
        &["operation"]  // operation: set_authorized/batch_set_authorized/set_paused
    ).expect("metric creation failed");

    /// Decision application latency
    pub static ref DECISION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ws_decision_duration_seconds",
            "Time spent applying an encrypted decision"
        ).buckets(exponential_buckets(0.00001, 2.0, 15).expect("valid buckets"))
    ).expect("metric creation failed");

    /// Pause flag (1 = paused)
    pub static ref CONTRACT_PAUSED: Gauge = Gauge::new(
        "ws_contract_paused",
        "Whether decision submission is paused"
    ).expect("metric creation failed");
}

/// Handle for the registered metrics.
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Registers all metrics with the global registry.
///
/// Safe to call more than once; metrics already registered are skipped.
///
/// # Errors
///
/// Any registration failure other than a duplicate.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(DECISIONS_APPLIED.clone()),
        Box::new(DECISIONS_REJECTED.clone()),
        Box::new(ADMIN_OPERATIONS.clone()),
        Box::new(DECISION_DURATION.clone()),
        Box::new(CONTRACT_PAUSED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encodes all metrics in the Prometheus text format.
///
/// # Errors
///
/// Encoding failures.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

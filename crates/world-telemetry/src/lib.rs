//! # World Telemetry
//!
//! Observability bootstrap for the encrypted world simulation.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` registry with an `EnvFilter` and either a
//!   pretty or JSON fmt layer
//! - **Metrics**: Prometheus counters, gauge, and histogram in a process-wide
//!   registry, rendered by [`gather_metrics`]
//!
//! ## Usage
//!
//! ```rust,ignore
//! use world_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let _guard = init_telemetry(TelemetryConfig::from_env()).expect("telemetry");
//!     // Application code here
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WS_SERVICE_NAME` | `world-simulation` | Service name in log lines |
//! | `WS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `WS_JSON_LOGS` | `false` (`true` in containers) | JSON log output |
//! | `WS_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `WS_NETWORK` | `localnet` | Network label |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::LoggingHandle;
pub use metrics::{
    gather_metrics, register_metrics, MetricsHandle, ADMIN_OPERATIONS, CONTRACT_PAUSED,
    DECISIONS_APPLIED, DECISIONS_REJECTED, DECISION_DURATION,
};

use thiserror::Error;

/// Telemetry initialization errors.
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metric registration or encoding failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// A configuration value could not be used.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Installs logging and registers metrics.
///
/// Returns a guard to hold for the lifetime of the application.
///
/// # Errors
///
/// Fails if a global subscriber is already installed, the log filter does not
/// parse, or metric registration fails.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    let logging = logging::init_logging(&config)?;

    tracing::info!(
        service = %config.service_name,
        network = %config.network,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard {
        _logging: logging,
        _metrics: metrics,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _logging: LoggingHandle,
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Increments a counter, optionally with label values.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name for log lines
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error, or a directive list)
    pub log_level: String,

    /// Whether to write logs to stdout
    pub console_output: bool,

    /// Whether to emit JSON formatted logs
    pub json_logs: bool,

    /// Network label (localnet, sepolia, ...)
    pub network: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "world-simulation".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            network: "localnet".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `WS_SERVICE_NAME`: Service name (default: world-simulation)
    /// - `WS_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `WS_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `WS_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    /// - `WS_NETWORK`: Network name (default: localnet)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] over an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("WS_SERVICE_NAME")
                .unwrap_or_else(|| "world-simulation".to_string()),

            log_level: lookup("WS_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),

            console_output: lookup("WS_CONSOLE_OUTPUT")
                .map_or(true, |v| v.to_lowercase() != "false" && v != "0"),

            json_logs: lookup("WS_JSON_LOGS")
                .map_or(is_container, |v| v.to_lowercase() == "true" || v == "1"),

            network: lookup("WS_NETWORK").unwrap_or_else(|| "localnet".to_string()),
        }
    }
}

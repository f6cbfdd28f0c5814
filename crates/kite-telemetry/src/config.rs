//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Pipeline stage this process runs (e.g. "check_message")
    pub stage: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output (for development)
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "kite-broker".to_string(),
            stage: "broker".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `KITE_SERVICE_NAME`: Service name (default: kite-broker)
    /// - `KITE_STAGE`: Pipeline stage name (default: broker)
    /// - `KITE_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `KITE_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `KITE_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("KITE_SERVICE_NAME")
                .unwrap_or_else(|_| "kite-broker".to_string()),

            stage: env::var("KITE_STAGE").unwrap_or_else(|_| "broker".to_string()),

            log_level: env::var("KITE_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("KITE_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v, true))
                .unwrap_or(true),

            json_logs: env::var("KITE_JSON_LOGS")
                .map(|v| parse_flag(&v, false))
                .unwrap_or(is_container),
        }
    }

    /// Create configuration for a specific pipeline stage.
    pub fn for_stage(stage: &str) -> Self {
        let mut config = Self::from_env();
        config.stage = stage.to_string();
        config
    }

    /// Service name qualified with the stage, e.g. `kite-broker/check_message`.
    pub fn full_service_name(&self) -> String {
        if self.stage == "broker" {
            self.service_name.clone()
        } else {
            format!("{}/{}", self.service_name, self.stage)
        }
    }
}

fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

//! # Kite Telemetry
//!
//! Observability shared by the Kite broker's pipeline stages.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` registry with env filtering and either a
//!   pretty or a JSON formatter
//! - **Metrics**: Prometheus counters, gauges and histograms in a global registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kite_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::for_stage("check_message");
//!     init_telemetry(&config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `KITE_SERVICE_NAME` | `kite-broker` | Service name in logs |
//! | `KITE_STAGE` | `broker` | Pipeline stage name |
//! | `KITE_LOG_LEVEL` | `info` | Log level filter |
//! | `KITE_JSON_LOGS` | `false` | JSON formatted logs |
//! | `KITE_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, CHECK_DURATION, CHECK_HEADER_CLAMPS, CHECK_MESSAGES,
    CHECK_REJECTIONS, STAGE_ERRORS, TOPIC_COUNT, TOPIC_REFRESHES,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and register metrics.
///
/// Call once at process start, before any pipeline stage is built.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

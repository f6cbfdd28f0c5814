//! Structured logging setup.
//!
//! Every log line carries consistent fields so a log shipper can index them:
//! - `stage`: Pipeline stage (check_message, persist, deliver, ...)
//! - `topic` / `message_id`: Message context, when there is one
//! - `message`: Log message

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `config.log_level` when both are set. JSON output is
/// meant for containers; the pretty formatter is for development. Fails if a
/// global subscriber is already installed.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    let json_layer = (config.console_output && config.json_logs).then(|| {
        fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });

    let pretty_layer = (config.console_output && !config.json_logs).then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(pretty_layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::info!(
        service = %config.full_service_name(),
        json_logs = config.json_logs,
        "Structured logging initialized"
    );

    Ok(())
}

/// Helper to create structured log entries with consistent formatting.
#[macro_export]
macro_rules! log_event {
    (info, $stage:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            stage = $stage,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $stage:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            stage = $stage,
            $($($field)*,)?
            $msg
        )
    };

    (error, $stage:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            stage = $stage,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $stage:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            stage = $stage,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a message-related event with standard fields.
#[macro_export]
macro_rules! log_message_event {
    ($level:ident, $stage:expr, $msg:expr, $topic:expr, $message_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            stage = $stage,
            topic = %$topic,
            message_id = %$message_id,
            $($($field)*,)?
            $msg
        )
    };
}

//! Error types for the check stage.
//!
//! Business rejections are not errors: they become negative acks. Only
//! conditions the stage cannot handle at all are returned to the caller.

use thiserror::Error;

/// Errors surfaced by the check stage.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The pipeline delivered an event this stage does not handle.
    #[error("Invalid event type for handler {handler}: {found}")]
    InvalidEventType {
        handler: String,
        found: &'static str,
    },

    /// The topic feed closed before delivering the first topic set.
    #[error("Topic feed closed before the first topic snapshot")]
    TopicFeedClosed,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Handler name must not be empty")]
    EmptyHandlerName,

    #[error("Max deliver limit must be positive, got {0}")]
    InvalidDeliverLimit(i32),

    #[error("Max expired window must be positive, got {0}s")]
    InvalidExpiredWindow(i64),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

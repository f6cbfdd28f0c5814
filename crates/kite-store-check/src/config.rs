//! Check stage configuration.
//!
//! Defaults are the broker's contract values; overriding them is a
//! deployment decision.
//!
//! # Example
//!
//! ```ignore
//! use kite_store_check::StoreCheckConfig;
//!
//! let config = StoreCheckConfig::from_env()?.with_handler_name("check");
//! config.validate()?;
//! ```

use serde::{Deserialize, Serialize};
use std::env;

use crate::domain::{HeaderPolicy, MAX_DELIVER_LIMIT, MAX_EXPIRED_TIME};
use crate::error::ConfigError;

/// Default name the stage registers under in the pipeline.
pub const DEFAULT_HANDLER_NAME: &str = "check_message";

/// Configuration of the check stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreCheckConfig {
    /// Pipeline handler name
    pub handler_name: String,
    /// Deliver limit cap
    pub max_deliver_limit: i32,
    /// Expiration window in seconds
    pub max_expired_secs: i64,
}

impl Default for StoreCheckConfig {
    fn default() -> Self {
        Self {
            handler_name: DEFAULT_HANDLER_NAME.to_string(),
            max_deliver_limit: MAX_DELIVER_LIMIT,
            max_expired_secs: MAX_EXPIRED_TIME.as_secs() as i64,
        }
    }
}

impl StoreCheckConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `KITE_CHECK_HANDLER_NAME`: Handler name (default: check_message)
    /// - `KITE_CHECK_MAX_DELIVER_LIMIT`: Deliver limit cap (default: 100)
    /// - `KITE_CHECK_MAX_EXPIRED_SECS`: Expiration window (default: 604800)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(name) = env::var("KITE_CHECK_HANDLER_NAME") {
            config.handler_name = name;
        }
        if let Some(limit) = parse_env("KITE_CHECK_MAX_DELIVER_LIMIT")? {
            config.max_deliver_limit = limit;
        }
        if let Some(secs) = parse_env("KITE_CHECK_MAX_EXPIRED_SECS")? {
            config.max_expired_secs = secs;
        }

        Ok(config)
    }

    /// Validate the configured bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.handler_name.trim().is_empty() {
            return Err(ConfigError::EmptyHandlerName);
        }
        if self.max_deliver_limit <= 0 {
            return Err(ConfigError::InvalidDeliverLimit(self.max_deliver_limit));
        }
        if self.max_expired_secs <= 0 {
            return Err(ConfigError::InvalidExpiredWindow(self.max_expired_secs));
        }
        Ok(())
    }

    /// Builder-style method to set the handler name
    pub fn with_handler_name(mut self, name: impl Into<String>) -> Self {
        self.handler_name = name.into();
        self
    }

    /// Header bounds derived from this configuration.
    pub fn header_policy(&self) -> HeaderPolicy {
        HeaderPolicy::new(self.max_deliver_limit, self.max_expired_secs)
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value }),
        Err(_) => Ok(None),
    }
}

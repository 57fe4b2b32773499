//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPFRONT_API_URL` - Base URL of the REST data store (see [`ApiConfig`])
//!
//! ## Optional
//! - `SHOPFRONT_POLL_INTERVAL_SECS` - Order list refresh period (default: 5, must be > 0)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::time::Duration;

use shopfront_api::ApiConfig;
use shopfront_api::config::{ConfigError, get_optional_env, get_parsed_or_default};

/// Default order list refresh period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Admin console configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Remote data store.
    pub api: ApiConfig,
    /// How often the order list is re-fetched.
    pub poll_interval: Duration,
    /// Sentry DSN for error tracking (optional)
    pub sentry_dsn: Option<String>,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the data store configuration is invalid or
    /// the poll interval is zero or not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api = ApiConfig::from_env()?;
        let poll_secs = get_parsed_or_default(
            "SHOPFRONT_POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL.as_secs(),
        )?;

        Ok(Self {
            api,
            poll_interval: poll_interval(poll_secs)?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
        })
    }
}

fn poll_interval(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            "SHOPFRONT_POLL_INTERVAL_SECS".to_string(),
            "must be greater than 0".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

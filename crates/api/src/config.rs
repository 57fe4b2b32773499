//! Data-store configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPFRONT_API_URL` - Base URL of the REST data store (e.g., `http://localhost:3008`)
//!
//! ## Optional
//! - `SHOPFRONT_API_TOKEN` - Bearer token sent with every request
//! - `SHOPFRONT_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `SHOPFRONT_CATALOG_CACHE_TTL_SECS` - Catalog cache TTL, `0` disables (default: 0)
//!
//! The helper functions are public so the storefront and admin configs read
//! their own variables the same way.

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Tokens below this many bits of entropy per character are rejected.
const MIN_TOKEN_ENTROPY: f64 = 3.3;

/// Substrings that mark a token copied from a sample `.env` (lowercase).
const PLACEHOLDER_MARKERS: &[&str] = &[
    "your-", "your_", "changeme", "placeholder", "example", "xxx", "todo", "token-here",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Remote data store configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL; resource paths are joined onto it.
    pub base_url: Url,
    /// Optional bearer token.
    pub token: Option<SecretString>,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Catalog cache TTL; `None` disables caching.
    ///
    /// Cached listings do not see stock changes made by other clients until
    /// they expire.
    pub catalog_cache_ttl: Option<Duration>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout", &self.request_timeout)
            .field("catalog_cache_ttl", &self.catalog_cache_ttl)
            .finish()
    }
}

impl ApiConfig {
    /// Configuration for a store at `base_url` with default timeouts, no
    /// token and no catalog cache.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            token: None,
            request_timeout: Duration::from_secs(10),
            catalog_cache_ttl: None,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the token fails validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let raw_url = get_required_env("SHOPFRONT_API_URL")?;
        let base_url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPFRONT_API_URL".to_string(), e.to_string())
        })?;
        let token = get_optional_env("SHOPFRONT_API_TOKEN")
            .map(|value| {
                validate_secret_strength(&value, "SHOPFRONT_API_TOKEN")?;
                Ok::<_, ConfigError>(SecretString::from(value))
            })
            .transpose()?;
        let timeout_secs = get_parsed_or_default("SHOPFRONT_REQUEST_TIMEOUT_SECS", 10_u64)?;
        let ttl_secs = get_parsed_or_default("SHOPFRONT_CATALOG_CACHE_TTL_SECS", 0_u64)?;

        Ok(Self {
            base_url,
            token,
            request_timeout: Duration::from_secs(timeout_secs),
            catalog_cache_ttl: (ttl_secs > 0).then(|| Duration::from_secs(ttl_secs)),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if the variable is unset.
pub fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
#[must_use]
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` if the value is present but does not parse.
pub fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Shannon entropy of `s` in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, u32> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }
    let total: u32 = counts.values().sum();
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    counts
        .values()
        .map(|&n| {
            let p = f64::from(n) / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject tokens that look copied from a sample or are too predictable.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let insecure = |reason: String| ConfigError::InsecureSecret(var_name.to_string(), reason);

    let lower = secret.to_lowercase();
    if let Some(marker) = PLACEHOLDER_MARKERS.iter().find(|m| lower.contains(*m)) {
        return Err(insecure(format!("looks like a placeholder ({marker:?})")));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_TOKEN_ENTROPY {
        return Err(insecure(format!(
            "{entropy:.2} bits/char is below the {MIN_TOKEN_ENTROPY:.1} minimum"
        )));
    }

    Ok(())
}

//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPFRONT_API_URL` - Base URL of the REST data store (see [`ApiConfig`])
//!
//! ## Optional
//! - `SHOPFRONT_IDENTITY_ID` - Subject id of the preset identity; unset means signed out
//! - `SHOPFRONT_IDENTITY_NAME` - Display name of the preset identity
//! - `SHOPFRONT_IDENTITY_EMAIL` - Email of the preset identity
//! - `SENTRY_DSN` - Sentry error tracking DSN
//!
//! The data store variables are documented in [`shopfront_api::config`].

use shopfront_api::ApiConfig;
use shopfront_api::config::{ConfigError, get_optional_env};
use shopfront_core::Identity;

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote data store.
    pub api: ApiConfig,
    /// Identity reported by the preset provider, if any.
    pub identity: Option<Identity>,
    /// Sentry DSN for error tracking (optional)
    pub sentry_dsn: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the data store configuration is invalid, or
    /// if a name or email is given without `SHOPFRONT_IDENTITY_ID`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api = ApiConfig::from_env()?;
        let identity = identity_from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api,
            identity,
            sentry_dsn,
        })
    }
}

fn identity_from_env() -> Result<Option<Identity>, ConfigError> {
    preset_identity(
        get_optional_env("SHOPFRONT_IDENTITY_ID"),
        get_optional_env("SHOPFRONT_IDENTITY_NAME"),
        get_optional_env("SHOPFRONT_IDENTITY_EMAIL"),
    )
}

fn preset_identity(
    subject_id: Option<String>,
    name: Option<String>,
    email: Option<String>,
) -> Result<Option<Identity>, ConfigError> {
    let Some(subject_id) = subject_id else {
        if name.is_some() || email.is_some() {
            return Err(ConfigError::MissingEnvVar(
                "SHOPFRONT_IDENTITY_ID".to_string(),
            ));
        }
        return Ok(None);
    };

    let mut identity = Identity::new(subject_id);
    identity.display_name = name;
    identity.email = email;
    Ok(Some(identity))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_no_preset_identity() {
        assert_eq!(preset_identity(None, None, None).unwrap(), None);
    }

    #[test]
    fn test_preset_identity_with_details() {
        let identity = preset_identity(
            Some("u1".to_string()),
            Some("Ada".to_string()),
            Some("ada@shop.test".to_string()),
        )
        .unwrap()
        .unwrap();

        assert_eq!(identity.subject_id.as_str(), "u1");
        assert_eq!(identity.display_name.as_deref(), Some("Ada"));
        assert_eq!(identity.email.as_deref(), Some("ada@shop.test"));
    }

    #[test]
    fn test_details_without_id_rejected() {
        let result = preset_identity(None, Some("Ada".to_string()), None);
        assert!(matches!(
            result,
            Err(ConfigError::MissingEnvVar(ref var)) if var == "SHOPFRONT_IDENTITY_ID"
        ));
    }
}

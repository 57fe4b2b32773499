//! Command implementations.

pub mod admin;
pub mod storefront;

use shopfront_admin::AdminError;
use shopfront_api::{ApiError, ConfigError};
use shopfront_storefront::AppError;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Environment configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The data store client could not be built.
    #[error("Client error: {0}")]
    Client(#[from] ApiError),

    #[error(transparent)]
    Storefront(#[from] AppError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    /// A command argument refers to something that does not exist.
    #[error("{0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Message for the terminal. Remote details stay in the log.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Storefront(e) => e.user_message(),
            Self::Admin(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Log the failure and print the user-facing message.
#[allow(clippy::print_stderr)]
pub fn report_failure(err: &CliError) {
    tracing::error!("Command failed: {err}");
    eprintln!("error: {}", err.user_message());
}

#[cfg(test)]
mod tests {
    use shopfront_storefront::Precondition;

    use super::*;

    #[test]
    fn test_user_message_hides_remote_details() {
        let err = CliError::from(AppError::from(ApiError::Status {
            status: 500,
            body: "stack trace".to_string(),
        }));
        assert!(!err.user_message().contains("stack trace"));
    }

    #[test]
    fn test_user_message_for_preconditions() {
        let err = CliError::from(AppError::from(Precondition::EmptyCart));
        assert_eq!(err.user_message(), "Your cart is empty");
    }

    #[test]
    fn test_config_error_is_shown() {
        let err = CliError::from(ConfigError::MissingEnvVar("SHOPFRONT_API_URL".to_string()));
        assert!(err.user_message().contains("SHOPFRONT_API_URL"));
    }
}

//! Unified error handling for the admin console.

use thiserror::Error;

use shopfront_api::ApiError;
use shopfront_core::StatusTransitionError;

/// Application-level error type for the admin console.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Data store operation failed.
    #[error("Remote error: {0}")]
    Remote(ApiError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Form input failed validation; nothing was sent.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The requested status change is not the single forward step.
    #[error("Invalid transition: {0}")]
    Transition(#[from] StatusTransitionError),
}

impl From<ApiError> for AdminError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(resource) => Self::NotFound(resource),
            other => Self::Remote(other),
        }
    }
}

impl AdminError {
    /// Message safe to show the operator.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote(ApiError::RateLimited(secs)) => {
                format!("Too many requests, please try again in {secs} seconds")
            }
            // Don't expose data store details
            Self::Remote(_) => "External service error".to_string(),
            Self::NotFound(_) => "Not found".to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::Transition(err) => err.to_string(),
        }
    }

    /// Whether repeating the same action may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Log the error, capturing remote failures to Sentry.
    pub fn report(&self) {
        if matches!(self, Self::Remote(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin operation failed"
            );
        } else {
            tracing::debug!(error = %self, "Admin operation rejected");
        }
    }

    /// [`report`](Self::report) and pass the error on.
    #[must_use]
    pub fn reported(self) -> Self {
        self.report();
        self
    }
}

/// Result type alias for `AdminError`.
pub type Result<T> = std::result::Result<T, AdminError>;

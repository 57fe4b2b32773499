//! Unified error handling with Sentry integration.
//!
//! [`AppError`] is the storefront's error taxonomy:
//!
//! - **NotFound** - a profile or product is absent
//! - **Validation** - a required field is missing; no request is sent
//! - **Remote** - network or server failure; transient and retryable
//! - **Precondition** - not signed in, empty cart, no address; blocked locally
//!
//! Operations return `Result<T, AppError>`. The view layer never sees a raw
//! transport error: it renders [`AppError::to_notice`] and follows
//! [`AppError::redirect`].

use thiserror::Error;

use shopfront_api::ApiError;
use shopfront_core::{AddressError, AddressId, ProductId};

use crate::services::identity::ProviderError;

/// A local check that failed before any request was made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Precondition {
    /// No identity or no bound profile.
    #[error("not signed in")]
    NotSignedIn,

    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// No delivery address was chosen.
    #[error("no delivery address selected")]
    NoAddressSelected,

    /// The chosen address is not in the bound profile.
    #[error("address {0} is not in the profile")]
    UnknownAddress(AddressId),

    /// The product has no stock left.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),
}

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Data store operation failed.
    #[error("Remote error: {0}")]
    Remote(ApiError),

    /// Identity provider operation failed.
    #[error("Identity provider error: {0}")]
    Identity(#[from] ProviderError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Local precondition not met.
    #[error("Precondition failed: {0}")]
    Precondition(#[from] Precondition),
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound(resource) => Self::NotFound(resource),
            other => Self::Remote(other),
        }
    }
}

impl From<AddressError> for AppError {
    fn from(err: AddressError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Where the view layer should go next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SignIn,
    OrderHistory,
}

/// Severity of a user notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl AppError {
    /// Message safe to show the user. Remote details are not exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Remote(ApiError::RateLimited(secs)) => {
                format!("Too many requests, please try again in {secs} seconds")
            }
            Self::Remote(_) => "Something went wrong, please try again".to_string(),
            Self::Identity(ProviderError::Cancelled) => "Sign-in was cancelled".to_string(),
            Self::Identity(_) => "Failed to sign in".to_string(),
            Self::NotFound(_) => "Not found".to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::Precondition(p) => match p {
                Precondition::NotSignedIn => "Please sign in to continue".to_string(),
                Precondition::EmptyCart => "Your cart is empty".to_string(),
                Precondition::NoAddressSelected => {
                    "Please select a delivery address".to_string()
                }
                Precondition::UnknownAddress(_) => "Invalid address selected".to_string(),
                Precondition::OutOfStock(_) => "This product is out of stock".to_string(),
            },
        }
    }

    /// Whether repeating the same action may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote(_) | Self::Identity(_))
    }

    /// Navigation the view layer should perform, if any.
    #[must_use]
    pub const fn redirect(&self) -> Option<Route> {
        match self {
            Self::Precondition(Precondition::NotSignedIn) => Some(Route::SignIn),
            _ => None,
        }
    }

    /// Convert to a user notice.
    #[must_use]
    pub fn to_notice(&self) -> Notice {
        let message = self.user_message();
        match self {
            Self::Precondition(_) | Self::Validation(_) => Notice::warning(message),
            _ => Notice::error(message),
        }
    }

    /// Log the error, capturing server-side failures to Sentry.
    pub fn report(&self) {
        if matches!(self, Self::Remote(_)) {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront operation failed"
            );
        } else {
            tracing::debug!(error = %self, "Storefront operation rejected");
        }
    }

    /// [`report`](Self::report) and pass the error on.
    #[must_use]
    pub fn reported(self) -> Self {
        self.report();
        self
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a profile id.
///
/// Call this after a profile is bound to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this when the profile is unbound.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "p1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

//! Identity provider error types.

use thiserror::Error;

/// Errors reported by an identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The user dismissed the interactive sign-in.
    #[error("sign-in cancelled")]
    Cancelled,

    /// Interactive sign-in is not available from this provider.
    #[error("interactive sign-in is not supported")]
    Unsupported,

    /// The provider failed.
    #[error("identity provider failed: {0}")]
    Failed(String),
}

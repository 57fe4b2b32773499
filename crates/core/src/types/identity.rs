//! Externally authenticated identity.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// The subject reported by the identity provider.
///
/// Read-only to the application; lives as long as the authenticated session.
/// The subject id doubles as the id of the user's [`Profile`](super::Profile).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject_id: UserId,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

impl Identity {
    /// Create an identity with no display name or email.
    #[must_use]
    pub fn new(subject_id: impl Into<UserId>) -> Self {
        Self {
            subject_id: subject_id.into(),
            display_name: None,
            email: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Set the email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

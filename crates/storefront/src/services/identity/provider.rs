//! Identity provider abstraction.
//!
//! The provider's own protocol is opaque. The application needs three
//! capabilities: observe the current identity, start an interactive sign-in,
//! and sign out.

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;

use shopfront_core::Identity;

use super::ProviderError;

/// An external identity provider.
///
/// The current identity is published on a `watch` channel: it holds at most
/// one value, delivers the initial value to every new subscriber, and a
/// newer value supersedes one not yet observed.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Subscribe to identity changes.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;

    /// Run the interactive sign-in flow.
    async fn sign_in_interactive(&self) -> Result<Identity, ProviderError>;

    /// End the provider session.
    async fn sign_out(&self) -> Result<(), ProviderError>;
}

/// A provider with a single identity fixed by configuration.
///
/// Starts signed out; interactive sign-in publishes the preset identity.
/// Without a preset, sign-in reports [`ProviderError::Unsupported`].
pub struct PresetIdentityProvider {
    preset: Option<Identity>,
    current: watch::Sender<Option<Identity>>,
}

impl PresetIdentityProvider {
    /// Create a signed-out provider.
    #[must_use]
    pub fn new(preset: Option<Identity>) -> Self {
        let (current, _) = watch::channel(None);
        Self { preset, current }
    }
}

#[async_trait]
impl IdentityProvider for PresetIdentityProvider {
    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }

    async fn sign_in_interactive(&self) -> Result<Identity, ProviderError> {
        let identity = self.preset.clone().ok_or(ProviderError::Unsupported)?;
        info!(subject_id = %identity.subject_id, "Signed in with preset identity");
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.current.send_replace(None);
        Ok(())
    }
}

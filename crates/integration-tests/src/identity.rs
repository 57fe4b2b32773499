//! Test-driven identity provider.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;

use shopfront_core::Identity;
use shopfront_storefront::{IdentityProvider, ProviderError};

/// An [`IdentityProvider`] whose emissions and sign-in results are scripted.
///
/// Successful sign-ins publish the identity before returning, like a real
/// provider whose listener fires after the interactive flow completes.
pub struct ScriptedIdentityProvider {
    current: watch::Sender<Option<Identity>>,
    sign_ins: Mutex<VecDeque<Result<Identity, ProviderError>>>,
    sign_out_error: Mutex<Option<ProviderError>>,
}

impl Default for ScriptedIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedIdentityProvider {
    /// A signed-out provider with no scripted sign-ins.
    #[must_use]
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current,
            sign_ins: Mutex::new(VecDeque::new()),
            sign_out_error: Mutex::new(None),
        }
    }

    /// Publish `identity` as the current identity.
    pub fn emit(&self, identity: Option<Identity>) {
        self.current.send_replace(identity);
    }

    /// Queue the result of the next interactive sign-in.
    pub fn script_sign_in(&self, result: Result<Identity, ProviderError>) {
        self.sign_ins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(result);
    }

    /// Make the next sign-out fail.
    pub fn fail_sign_out(&self, error: ProviderError) {
        *self
            .sign_out_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
    }
}

#[async_trait]
impl IdentityProvider for ScriptedIdentityProvider {
    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }

    async fn sign_in_interactive(&self) -> Result<Identity, ProviderError> {
        let next = self
            .sign_ins
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Err(ProviderError::Cancelled));
        let identity = next?;
        self.current.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let error = self
            .sign_out_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(error) = error {
            return Err(error);
        }
        self.current.send_replace(None);
        Ok(())
    }
}

//! Identity-to-profile binding.
//!
//! Keeps exactly one [`Profile`] in sync with the identity reported by the
//! [`IdentityProvider`]:
//!
//! 1. An identity is observed: fetch its profile by subject id.
//! 2. Found: bind it. Not found: create the minimal profile, then bind it.
//! 3. Any other failure leaves the profile unbound and is surfaced; there is
//!    no automatic retry.
//! 4. The identity is cleared: unbind immediately. Nothing is deleted remotely.
//!
//! # Re-entrancy
//!
//! Providers fire on initial load and again after interactive sign-in, so the
//! same subject is routinely observed twice. The fetch-or-create sequence
//! runs under a single in-flight guard; a duplicate observation waits for it
//! and is then answered from the binding without a remote call, so at most
//! one profile is created per identity. Every change of subject bumps a
//! generation counter, and work started for an older generation never binds.

mod error;
mod provider;

pub use error::ProviderError;
pub use provider::{IdentityProvider, PresetIdentityProvider};

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use shopfront_api::{ApiError, DataApi};
use shopfront_core::{Identity, Profile, UserId};

use crate::error::{AppError, Precondition, clear_sentry_user, set_sentry_user};

/// Result of observing an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    /// A profile is bound for the observed identity.
    Bound(Profile),
    /// The identity was cleared and no profile is bound.
    Unbound,
    /// A newer identity was observed before this one finished binding.
    Superseded,
}

/// The session's binding between identity and profile.
///
/// Cheap to clone; clones share the same binding.
#[derive(Clone)]
pub struct IdentityBinding {
    inner: Arc<BindingInner>,
}

struct BindingInner {
    api: Arc<dyn DataApi>,
    provider: Arc<dyn IdentityProvider>,
    state: RwLock<BindingState>,
    /// Held for the whole fetch-or-create sequence.
    in_flight: Mutex<()>,
}

#[derive(Default)]
struct BindingState {
    identity: Option<Identity>,
    profile: Option<Profile>,
    generation: u64,
}

impl IdentityBinding {
    /// Create an unbound binding.
    #[must_use]
    pub fn new(api: Arc<dyn DataApi>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            inner: Arc::new(BindingInner {
                api,
                provider,
                state: RwLock::new(BindingState::default()),
                in_flight: Mutex::new(()),
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BindingState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BindingState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The current identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.read().identity.clone()
    }

    /// The bound profile, if any.
    #[must_use]
    pub fn profile(&self) -> Option<Profile> {
        self.read().profile.clone()
    }

    /// Both the identity and its bound profile.
    ///
    /// # Errors
    ///
    /// Returns [`Precondition::NotSignedIn`] unless both are present.
    pub fn require(&self) -> Result<(Identity, Profile), Precondition> {
        let state = self.read();
        match (&state.identity, &state.profile) {
            (Some(identity), Some(profile)) => Ok((identity.clone(), profile.clone())),
            _ => Err(Precondition::NotSignedIn),
        }
    }

    /// Record a newly observed identity and return its generation.
    ///
    /// A change of subject drops the previous profile at once and starts a
    /// new generation; the same subject keeps both.
    fn begin(&self, identity: Option<&Identity>) -> u64 {
        let mut state = self.write();
        let previous = state.identity.as_ref().map(|i| &i.subject_id);
        let next = identity.map(|i| &i.subject_id);
        if previous != next {
            state.generation += 1;
            if state.profile.take().is_some() {
                clear_sentry_user();
            }
        }
        state.identity = identity.cloned();
        state.generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.read().generation == generation
    }

    fn bound_profile_for(&self, subject_id: &UserId) -> Option<Profile> {
        self.read()
            .profile
            .as_ref()
            .filter(|p| &p.id == subject_id)
            .cloned()
    }

    /// Bind `profile` if `generation` is still current.
    fn bind(&self, generation: u64, profile: Profile) -> bool {
        let mut state = self.write();
        if state.generation != generation {
            return false;
        }
        set_sentry_user(&profile.id, Some(profile.email.as_str()).filter(|e| !e.is_empty()));
        state.profile = Some(profile);
        true
    }

    /// Handle an identity change notification.
    ///
    /// # Errors
    ///
    /// Returns the remote failure when the profile can be neither fetched nor
    /// created. The profile stays unbound for this identity until the next
    /// observation or [`refresh`](Self::refresh).
    #[instrument(skip(self, identity), fields(subject_id))]
    pub async fn observe(&self, identity: Option<Identity>) -> Result<BindOutcome, AppError> {
        let generation = self.begin(identity.as_ref());

        let Some(identity) = identity else {
            debug!("Identity cleared, profile unbound");
            return Ok(BindOutcome::Unbound);
        };
        tracing::Span::current().record("subject_id", identity.subject_id.as_str());

        let _guard = self.inner.in_flight.lock().await;

        if !self.is_current(generation) {
            return Ok(BindOutcome::Superseded);
        }
        if let Some(profile) = self.bound_profile_for(&identity.subject_id) {
            debug!("Profile already bound for this identity");
            return Ok(BindOutcome::Bound(profile));
        }

        let profile = match self.fetch_or_create(&identity).await {
            Ok(profile) => profile,
            Err(err) if !self.is_current(generation) => {
                debug!(error = %err, "Binding failed after being superseded");
                return Ok(BindOutcome::Superseded);
            }
            Err(err) => return Err(err.reported()),
        };

        if self.bind(generation, profile.clone()) {
            Ok(BindOutcome::Bound(profile))
        } else {
            Ok(BindOutcome::Superseded)
        }
    }

    /// Fetch the profile for `identity`, creating the minimal one if absent.
    async fn fetch_or_create(&self, identity: &Identity) -> Result<Profile, AppError> {
        match self.inner.api.get_user(&identity.subject_id).await {
            Ok(profile) => Ok(profile),
            Err(ApiError::NotFound(_)) => {
                let profile = Profile::for_identity(identity);
                self.inner.api.create_user(&profile).await?;
                info!(user_id = %profile.id, "Created profile for new identity");
                Ok(profile)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Re-fetch the bound profile so the in-memory copy matches the store.
    ///
    /// A no-op returning `None` when no identity is present. Last write wins;
    /// there is no merge with the local copy.
    ///
    /// # Errors
    ///
    /// Returns the remote failure; the previous binding is kept.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Option<Profile>, AppError> {
        let _guard = self.inner.in_flight.lock().await;

        let (subject_id, generation) = {
            let state = self.read();
            match &state.identity {
                Some(identity) => (identity.subject_id.clone(), state.generation),
                None => return Ok(None),
            }
        };

        let profile = self
            .inner
            .api
            .get_user(&subject_id)
            .await
            .map_err(|e| AppError::from(e).reported())?;

        if self.bind(generation, profile.clone()) {
            Ok(Some(profile))
        } else {
            Ok(None)
        }
    }

    /// Run interactive sign-in, then bind the profile before returning.
    ///
    /// # Errors
    ///
    /// Returns the provider failure, the binding failure, or
    /// [`Precondition::NotSignedIn`] if a sign-out overtook the sign-in.
    #[instrument(skip(self))]
    pub async fn sign_in(&self) -> Result<Profile, AppError> {
        let identity = self.inner.provider.sign_in_interactive().await?;
        info!(subject_id = %identity.subject_id, "Interactive sign-in completed");

        match self.observe(Some(identity)).await? {
            BindOutcome::Bound(profile) => Ok(profile),
            BindOutcome::Unbound | BindOutcome::Superseded => {
                Err(Precondition::NotSignedIn.into())
            }
        }
    }

    /// Sign out with the provider, then unbind.
    ///
    /// # Errors
    ///
    /// Returns the provider failure; the binding is left untouched.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), AppError> {
        self.inner.provider.sign_out().await?;
        self.begin(None);
        info!("Signed out");
        Ok(())
    }

    /// Follow the provider's identity changes in a background task.
    ///
    /// The current identity is observed immediately. A newer identity
    /// arriving while a binding is in flight cancels that binding.
    #[must_use]
    pub fn listen(&self) -> IdentityListener {
        let mut rx = self.inner.provider.subscribe();
        let binding = self.clone();

        let task = tokio::spawn(async move {
            loop {
                let identity = rx.borrow_and_update().clone();
                let superseded = tokio::select! {
                    result = binding.observe(identity) => {
                        if let Err(err) = result {
                            warn!(error = %err, "Profile binding failed");
                        }
                        false
                    }
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        debug!("Identity changed while binding, restarting");
                        true
                    }
                };
                if !superseded && rx.changed().await.is_err() {
                    break;
                }
            }
            debug!("Identity provider closed, listener stopped");
        });

        IdentityListener { task }
    }
}

/// Handle to the task started by [`IdentityBinding::listen`].
///
/// Dropping the handle stops the task.
pub struct IdentityListener {
    task: JoinHandle<()>,
}

impl IdentityListener {
    /// Stop following identity changes.
    pub fn stop(self) {
        drop(self);
    }

    /// Whether the task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for IdentityListener {
    fn drop(&mut self) {
        self.task.abort();
    }
}

//! Session state.

use std::sync::Arc;

use shopfront_api::DataApi;
use shopfront_core::{AddressId, NewAddress, ProductId, Profile, WishlistChange};

use crate::account::{self, Dashboard};
use crate::cart::CartStore;
use crate::catalog::{self, Catalog};
use crate::checkout::{self, PlacedOrder};
use crate::error::Result;
use crate::services::identity::{IdentityBinding, IdentityListener, IdentityProvider};

/// One browsing session.
///
/// Owns the cart and the identity binding, and holds the data store handle
/// the session's operations go through. Created at startup and dropped at
/// teardown; nothing is persisted.
pub struct Session {
    api: Arc<dyn DataApi>,
    binding: IdentityBinding,
    cart: CartStore,
}

impl Session {
    /// Create a session with an empty cart and no bound profile.
    #[must_use]
    pub fn new(api: Arc<dyn DataApi>, provider: Arc<dyn IdentityProvider>) -> Self {
        let binding = IdentityBinding::new(Arc::clone(&api), provider);
        Self {
            api,
            binding,
            cart: CartStore::new(),
        }
    }

    /// Get a reference to the data store.
    #[must_use]
    pub fn api(&self) -> &dyn DataApi {
        self.api.as_ref()
    }

    #[must_use]
    pub const fn binding(&self) -> &IdentityBinding {
        &self.binding
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    /// Follow identity changes in the background.
    #[must_use]
    pub fn listen(&self) -> IdentityListener {
        self.binding.listen()
    }

    /// See [`catalog::load_catalog`].
    ///
    /// # Errors
    ///
    /// Returns the remote failure.
    pub async fn load_catalog(&self) -> Result<Catalog> {
        catalog::load_catalog(self.api.as_ref()).await
    }

    /// See [`checkout::place_order`].
    ///
    /// # Errors
    ///
    /// Returns the failed precondition or the remote failure; the cart is
    /// unchanged on error.
    pub async fn place_order(&mut self, address_id: Option<&AddressId>) -> Result<PlacedOrder> {
        checkout::place_order(self.api.as_ref(), &self.binding, &mut self.cart, address_id).await
    }

    /// See [`checkout::add_address`].
    ///
    /// # Errors
    ///
    /// Returns the validation, precondition or remote failure.
    pub async fn add_address(&self, address: NewAddress) -> Result<Profile> {
        checkout::add_address(self.api.as_ref(), &self.binding, address).await
    }

    /// See [`account::toggle_wishlist`].
    ///
    /// # Errors
    ///
    /// Returns the precondition or remote failure.
    pub async fn toggle_wishlist(&self, product_id: &ProductId) -> Result<WishlistChange> {
        account::toggle_wishlist(self.api.as_ref(), &self.binding, product_id).await
    }

    /// See [`account::remove_from_wishlist`].
    ///
    /// # Errors
    ///
    /// Returns the precondition or remote failure.
    pub async fn remove_from_wishlist(&self, product_id: &ProductId) -> Result<()> {
        account::remove_from_wishlist(self.api.as_ref(), &self.binding, product_id).await
    }

    #[must_use]
    pub fn is_in_wishlist(&self, product_id: &ProductId) -> bool {
        account::is_in_wishlist(&self.binding, product_id)
    }

    /// See [`account::load_dashboard`].
    ///
    /// # Errors
    ///
    /// Returns the precondition or remote failure.
    pub async fn load_dashboard(&self) -> Result<Dashboard> {
        account::load_dashboard(self.api.as_ref(), &self.binding).await
    }
}

//! User profiles and delivery addresses.
//!
//! A [`Profile`] is the application's own record about an [`Identity`]:
//! wishlist and saved addresses. The remote store never edits lists
//! piecemeal; the client computes the full new list and sends it in a
//! [`ProfilePatch`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::{AddressId, ProductId, UserId};
use super::identity::Identity;

/// A saved delivery address. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub label: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// Errors that can occur when validating a [`NewAddress`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// A required field is blank.
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// Address form input, before an id is assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub label: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl NewAddress {
    /// Check that every field is filled in.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingField`] naming the first blank field.
    pub fn validate(&self) -> Result<(), AddressError> {
        let fields = [
            ("label", &self.label),
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zipCode", &self.zip_code),
            ("country", &self.country),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(AddressError::MissingField(name));
            }
        }
        Ok(())
    }

    /// Attach an id, producing an immutable [`Address`].
    #[must_use]
    pub fn with_id(self, id: AddressId) -> Address {
        Address {
            id,
            label: self.label,
            street: self.street,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
        }
    }
}

/// Outcome of a wishlist toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistChange {
    Added,
    Removed,
}

/// The application-level user record. Exactly one per identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Equal to the identity's subject id.
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub wishlist: Vec<ProductId>,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

impl Profile {
    /// The minimal profile created on first sight of an identity.
    #[must_use]
    pub fn for_identity(identity: &Identity) -> Self {
        Self {
            id: identity.subject_id.clone(),
            email: identity.email.clone().unwrap_or_default(),
            name: identity.display_name.clone().unwrap_or_default(),
            wishlist: Vec::new(),
            addresses: Vec::new(),
        }
    }

    /// Whether a product is on the wishlist.
    #[must_use]
    pub fn has_wishlisted(&self, product_id: &ProductId) -> bool {
        self.wishlist.contains(product_id)
    }

    /// The full wishlist after toggling `product_id`, and which way it went.
    ///
    /// Removing drops every occurrence, so a list that somehow arrived with
    /// duplicates is healed rather than propagated.
    #[must_use]
    pub fn wishlist_toggled(&self, product_id: &ProductId) -> (Vec<ProductId>, WishlistChange) {
        if self.has_wishlisted(product_id) {
            (self.wishlist_without(product_id), WishlistChange::Removed)
        } else {
            let mut wishlist = self.wishlist.clone();
            wishlist.push(product_id.clone());
            (wishlist, WishlistChange::Added)
        }
    }

    /// The full wishlist with `product_id` removed.
    #[must_use]
    pub fn wishlist_without(&self, product_id: &ProductId) -> Vec<ProductId> {
        self.wishlist
            .iter()
            .filter(|id| *id != product_id)
            .cloned()
            .collect()
    }

    /// Look up a saved address.
    #[must_use]
    pub fn address(&self, id: &AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| &a.id == id)
    }

    /// The full address list with `address` appended.
    #[must_use]
    pub fn addresses_with(&self, address: Address) -> Vec<Address> {
        let mut addresses = self.addresses.clone();
        addresses.push(address);
        addresses
    }
}

/// Partial profile update. List fields replace the remote list wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wishlist: Option<Vec<ProductId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Address>>,
}

impl ProfilePatch {
    /// Replace the wishlist.
    #[must_use]
    pub const fn wishlist(wishlist: Vec<ProductId>) -> Self {
        Self {
            wishlist: Some(wishlist),
            addresses: None,
        }
    }

    /// Replace the address list.
    #[must_use]
    pub const fn addresses(addresses: Vec<Address>) -> Self {
        Self {
            wishlist: None,
            addresses: Some(addresses),
        }
    }

    /// Apply the patch to a profile in place.
    pub fn apply(&self, profile: &mut Profile) {
        if let Some(wishlist) = &self.wishlist {
            profile.wishlist.clone_from(wishlist);
        }
        if let Some(addresses) = &self.addresses {
            profile.addresses.clone_from(addresses);
        }
    }
}

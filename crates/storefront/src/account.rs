//! Customer account: wishlist and dashboard.
//!
//! Profile lists are replaced wholesale. The full new list is computed
//! locally, sent, and the binding is refreshed from the store afterwards.

use tracing::{info, instrument};

use shopfront_api::DataApi;
use shopfront_core::{
    Order, Product, ProductId, Profile, ProfilePatch, WishlistChange, sort_newest_first,
};

use crate::error::{AppError, Result};
use crate::services::identity::IdentityBinding;

/// Whether `product_id` is on the bound profile's wishlist.
///
/// False when no profile is bound.
#[must_use]
pub fn is_in_wishlist(binding: &IdentityBinding, product_id: &ProductId) -> bool {
    binding
        .profile()
        .is_some_and(|p| p.has_wishlisted(product_id))
}

/// Add the product to the wishlist, or remove it if already there.
///
/// # Errors
///
/// Returns [`NotSignedIn`](crate::Precondition::NotSignedIn) without a bound profile, or the
/// remote failure.
#[instrument(skip(api, binding), fields(product_id = %product_id))]
pub async fn toggle_wishlist(
    api: &dyn DataApi,
    binding: &IdentityBinding,
    product_id: &ProductId,
) -> Result<WishlistChange> {
    let (_, profile) = binding.require()?;
    let (wishlist, change) = profile.wishlist_toggled(product_id);
    save_wishlist(api, binding, &profile, wishlist).await?;
    info!(?change, "Wishlist updated");
    Ok(change)
}

/// Remove the product from the wishlist.
///
/// # Errors
///
/// Returns [`NotSignedIn`](crate::Precondition::NotSignedIn) without a bound profile, or the
/// remote failure.
#[instrument(skip(api, binding), fields(product_id = %product_id))]
pub async fn remove_from_wishlist(
    api: &dyn DataApi,
    binding: &IdentityBinding,
    product_id: &ProductId,
) -> Result<()> {
    let (_, profile) = binding.require()?;
    let wishlist = profile.wishlist_without(product_id);
    save_wishlist(api, binding, &profile, wishlist).await
}

async fn save_wishlist(
    api: &dyn DataApi,
    binding: &IdentityBinding,
    profile: &Profile,
    wishlist: Vec<ProductId>,
) -> Result<()> {
    api.update_user(&profile.id, &ProfilePatch::wishlist(wishlist))
        .await
        .map_err(|e| AppError::from(e).reported())?;
    binding.refresh().await?;
    Ok(())
}

/// What the customer dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub profile: Profile,
    /// Wishlisted products, in catalog order.
    pub wishlist: Vec<Product>,
    /// The customer's orders, newest first.
    pub orders: Vec<Order>,
}

/// Load the dashboard for the bound profile.
///
/// # Errors
///
/// Returns [`NotSignedIn`](crate::Precondition::NotSignedIn) without a bound profile, or the
/// remote failure.
#[instrument(skip_all)]
pub async fn load_dashboard(api: &dyn DataApi, binding: &IdentityBinding) -> Result<Dashboard> {
    let (_, profile) = binding.require()?;

    let (products, mut orders) =
        tokio::try_join!(api.list_products(), api.list_orders_by_user(&profile.id))
            .map_err(|e| AppError::from(e).reported())?;

    let wishlist = products
        .into_iter()
        .filter(|p| profile.has_wishlisted(&p.id))
        .collect();
    sort_newest_first(&mut orders);

    Ok(Dashboard {
        profile,
        wishlist,
        orders,
    })
}

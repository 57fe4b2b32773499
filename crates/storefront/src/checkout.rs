//! Order placement and address creation.

use chrono::Utc;
use tracing::{info, instrument};

use shopfront_api::DataApi;
use shopfront_core::{AddressId, NewAddress, NewOrder, Order, Profile, ProfilePatch};

use crate::cart::{CartLine, CartStore};
use crate::error::{AppError, Precondition, Result, Route, add_breadcrumb};
use crate::services::identity::IdentityBinding;

/// A submitted order and where to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order: Order,
    pub next: Route,
}

/// Turn the cart into a submitted order.
///
/// Preconditions are checked in order, each with its own rejection:
/// signed in with a bound profile, non-empty cart, an address selected,
/// and that address present in the bound profile. None of them sends a
/// request.
///
/// Lines and the address are copied into the order by value. The cart is
/// cleared only after the store confirms the order.
///
/// # Errors
///
/// Returns the first failed [`Precondition`], or the remote failure. On any
/// error the cart is left exactly as it was.
#[instrument(skip_all, fields(lines = cart.len()))]
pub async fn place_order(
    api: &dyn DataApi,
    binding: &IdentityBinding,
    cart: &mut CartStore,
    address_id: Option<&AddressId>,
) -> Result<PlacedOrder> {
    let (_, profile) = binding.require()?;
    if cart.is_empty() {
        return Err(Precondition::EmptyCart.into());
    }
    let address_id = address_id.ok_or(Precondition::NoAddressSelected)?;
    let address = profile
        .address(address_id)
        .cloned()
        .ok_or_else(|| Precondition::UnknownAddress(address_id.clone()))?;

    let lines = cart.lines().iter().map(CartLine::to_order_line).collect();
    let order = NewOrder::new(profile.id, lines, address, Utc::now());

    add_breadcrumb("checkout", "Submitting order", Some(&[("address_id", address_id.as_str())]));

    let order = api.create_order(&order).await.map_err(|e| AppError::from(e).reported())?;

    cart.clear();
    info!(order_id = %order.id, total = %order.total, "Order placed");

    Ok(PlacedOrder {
        order,
        next: Route::OrderHistory,
    })
}

/// Append a new address to the bound profile.
///
/// The full address list is sent, then the binding is refreshed so the
/// returned profile is the store's copy.
///
/// # Errors
///
/// Returns [`Precondition::NotSignedIn`] without a bound profile,
/// [`AppError::Validation`] for a blank field (no request is sent), or the
/// remote failure.
#[instrument(skip_all, fields(label = %address.label))]
pub async fn add_address(
    api: &dyn DataApi,
    binding: &IdentityBinding,
    address: NewAddress,
) -> Result<Profile> {
    let (_, profile) = binding.require()?;
    address.validate()?;

    let id = AddressId::generate(Utc::now(), |id| profile.address(id).is_some());
    let addresses = profile.addresses_with(address.with_id(id));

    api.update_user(&profile.id, &ProfilePatch::addresses(addresses))
        .await
        .map_err(|e| AppError::from(e).reported())?;
    info!(user_id = %profile.id, "Address added");

    binding
        .refresh()
        .await?
        .ok_or_else(|| Precondition::NotSignedIn.into())
}

//! Integration tests for Shopfront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```
//!
//! No network or external services are needed. Scenarios run against
//! [`MemoryStore`], an in-memory [`DataApi`], and
//! [`ScriptedIdentityProvider`], an identity provider driven by the test.
//!
//! # Test Categories
//!
//! - `identity_binding` - fetch-or-create, duplicate and superseded identities
//! - `cart_checkout` - cart properties, order placement, addresses
//! - `catalog_account` - catalog loading, wishlist and dashboard
//! - `admin_orders` - status transitions and the poll loop
//! - `admin_products` - product form submission

#![cfg_attr(not(test), forbid(unsafe_code))]

mod identity;
mod store;

pub use identity::ScriptedIdentityProvider;
pub use store::MemoryStore;

use chrono::{DateTime, TimeZone, Utc};
use shopfront_api::DataApi;
use shopfront_core::{
    Address, AddressId, Category, CategoryId, NewAddress, NewOrder, Order, OrderId, OrderLine,
    OrderStatus, Price, Product, ProductId, UserId,
};

/// A product with the given id, name, price in cents and stock.
#[must_use]
pub fn product(id: &str, name: &str, cents: i64, stock: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: "Phones".to_string(),
        price: Price::from_cents(cents),
        stock,
        description: format!("{name} description"),
        image: format!("https://img.example/{id}.png"),
    }
}

#[must_use]
pub fn category(id: &str, name: &str) -> Category {
    Category {
        id: CategoryId::new(id),
        name: name.to_string(),
        description: String::new(),
    }
}

/// A complete address input.
#[must_use]
pub fn new_address(label: &str) -> NewAddress {
    NewAddress {
        label: label.to_string(),
        street: "1 Infinite Loop".to_string(),
        city: "Cupertino".to_string(),
        state: "CA".to_string(),
        zip_code: "95014".to_string(),
        country: "USA".to_string(),
    }
}

#[must_use]
pub fn address(id: &str) -> Address {
    new_address("Home").with_id(AddressId::new(id))
}

/// Noon UTC on the given day of March 2025.
///
/// # Panics
///
/// Panics if `day` is not a valid day of March.
#[must_use]
pub fn march(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("invalid day {day}"))
}

/// A one-line order for `user_id`.
#[must_use]
pub fn order(id: &str, user_id: &str, status: OrderStatus, created_at: DateTime<Utc>) -> Order {
    let line = OrderLine {
        product_id: ProductId::new("p1"),
        quantity: 1,
        price: Price::from_cents(1000),
        name: "Pixel 8".to_string(),
    };
    let mut order = NewOrder::new(UserId::new(user_id), vec![line], address("a1"), created_at)
        .with_id(OrderId::new(id));
    order.status = status;
    order
}

/// Upcast for APIs taking a shared store handle.
#[must_use]
pub fn shared(store: &std::sync::Arc<MemoryStore>) -> std::sync::Arc<dyn DataApi> {
    std::sync::Arc::clone(store) as std::sync::Arc<dyn DataApi>
}

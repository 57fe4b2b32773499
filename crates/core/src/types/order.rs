//! Orders and order lines.
//!
//! An order embeds snapshots: each line copies the product's name and price
//! and the delivery address is copied by value. Later catalog or profile
//! edits never reach a placed order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId, UserId};
use super::price::Price;
use super::profile::Address;
use super::status::OrderStatus;

/// One purchased product, snapshotted at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
    pub name: String,
}

impl OrderLine {
    /// `price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// An order as submitted, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: UserId,
    pub products: Vec<OrderLine>,
    pub total: Price,
    pub address: Address,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl NewOrder {
    /// Build an order in the `On Process` state.
    ///
    /// The total is computed from `products`, so it always equals the sum of
    /// `price × quantity` over the lines.
    #[must_use]
    pub fn new(
        user_id: UserId,
        products: Vec<OrderLine>,
        address: Address,
        created_at: DateTime<Utc>,
    ) -> Self {
        let total = products.iter().map(OrderLine::subtotal).sum();
        Self {
            user_id,
            products,
            total,
            address,
            status: OrderStatus::OnProcess,
            created_at,
        }
    }

    /// Attach a store-assigned id.
    #[must_use]
    pub fn with_id(self, id: OrderId) -> Order {
        Order {
            id,
            user_id: self.user_id,
            products: self.products,
            total: self.total,
            address: self.address,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub products: Vec<OrderLine>,
    pub total: Price,
    pub address: Address,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.products.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// Sort orders newest first by creation time. Stable for equal timestamps.
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

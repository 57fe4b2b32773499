//! The data-access contract.

use async_trait::async_trait;

use shopfront_core::{
    Category, NewOrder, NewProduct, Order, OrderId, OrderStatus, Product, ProductId, ProductPatch,
    Profile, ProfilePatch, UserId,
};

use crate::ApiError;

/// Request/response operations over the remote store.
///
/// Each call is independent; the store offers no transactions across
/// entities. Lookups of a missing record fail with [`ApiError::NotFound`].
#[async_trait]
pub trait DataApi: Send + Sync {
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError>;

    async fn list_products(&self) -> Result<Vec<Product>, ApiError>;

    async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError>;

    async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError>;

    async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError>;

    async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError>;

    async fn list_orders(&self) -> Result<Vec<Order>, ApiError>;

    async fn list_orders_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, ApiError>;

    async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError>;

    /// Targeted update of the `status` field only.
    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError>;

    async fn get_user(&self, id: &UserId) -> Result<Profile, ApiError>;

    async fn create_user(&self, profile: &Profile) -> Result<Profile, ApiError>;

    async fn update_user(&self, id: &UserId, patch: &ProfilePatch) -> Result<Profile, ApiError>;
}

//! In-memory data store.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use shopfront_api::{ApiError, DataApi};
use shopfront_core::{
    Category, NewOrder, NewProduct, Order, OrderId, OrderStatus, Product, ProductId, ProductPatch,
    Profile, ProfilePatch, UserId,
};

#[derive(Default)]
struct Records {
    categories: Vec<Category>,
    products: Vec<Product>,
    orders: Vec<Order>,
    users: BTreeMap<UserId, Profile>,
    next_id: u64,
}

impl Records {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

/// A [`DataApi`] backed by memory.
///
/// Every call is counted by operation name (the trait method name). An
/// operation can be made to fail with a `503` until it is recovered, and a
/// latency can be added to every call so concurrent callers overlap.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Records>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
    latency: Mutex<Option<Duration>>,
    delayed_replies: Mutex<HashMap<&'static str, Duration>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_products(self, products: Vec<Product>) -> Self {
        lock(&self.records).products = products;
        self
    }

    #[must_use]
    pub fn with_categories(self, categories: Vec<Category>) -> Self {
        lock(&self.records).categories = categories;
        self
    }

    #[must_use]
    pub fn with_orders(self, orders: Vec<Order>) -> Self {
        lock(&self.records).orders = orders;
        self
    }

    #[must_use]
    pub fn with_user(self, profile: Profile) -> Self {
        lock(&self.records).users.insert(profile.id.clone(), profile);
        self
    }

    /// Stored profile, read without counting a call.
    #[must_use]
    pub fn user(&self, id: &UserId) -> Option<Profile> {
        lock(&self.records).users.get(id).cloned()
    }

    #[must_use]
    pub fn users(&self) -> Vec<Profile> {
        lock(&self.records).users.values().cloned().collect()
    }

    #[must_use]
    pub fn orders(&self) -> Vec<Order> {
        lock(&self.records).orders.clone()
    }

    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        lock(&self.records).products.clone()
    }

    /// Change an order behind the console's back.
    pub fn set_order_status(&self, id: &OrderId, status: OrderStatus) {
        if let Some(order) = lock(&self.records).orders.iter_mut().find(|o| &o.id == id) {
            order.status = status;
        }
    }

    /// Number of calls made to `operation`.
    #[must_use]
    pub fn calls(&self, operation: &str) -> usize {
        lock(&self.calls).get(operation).copied().unwrap_or(0)
    }

    /// Number of calls made to any operation.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        lock(&self.calls).values().sum()
    }

    /// Make `operation` fail until [`recover`](Self::recover) is called.
    pub fn fail(&self, operation: &'static str) {
        lock(&self.failing).insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        lock(&self.failing).remove(operation);
    }

    /// Delay every call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.latency) = Some(latency);
    }

    /// Hold the next response of `operation` for `delay` after its records
    /// have been read, so it reaches the caller stale.
    pub fn delay_next_reply(&self, operation: &'static str, delay: Duration) {
        lock(&self.delayed_replies).insert(operation, delay);
    }

    async fn reply(&self, operation: &'static str) {
        let delay = lock(&self.delayed_replies).remove(operation);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    async fn enter(&self, operation: &'static str) -> Result<(), ApiError> {
        *lock(&self.calls).entry(operation).or_insert(0) += 1;

        let latency = *lock(&self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if lock(&self.failing).contains(operation) {
            return Err(ApiError::Status {
                status: 503,
                body: format!("{operation} unavailable"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DataApi for MemoryStore {
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.enter("list_categories").await?;
        Ok(lock(&self.records).categories.clone())
    }

    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.enter("list_products").await?;
        Ok(lock(&self.records).products.clone())
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        self.enter("get_product").await?;
        lock(&self.records)
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("products/{id}")))
    }

    async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        self.enter("create_product").await?;
        let mut records = lock(&self.records);
        let id = ProductId::new(records.next_id("p"));
        let product = product.clone().with_id(id);
        records.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError> {
        self.enter("update_product").await?;
        let mut records = lock(&self.records);
        let product = records
            .products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("products/{id}")))?;
        patch.apply(product);
        Ok(product.clone())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        self.enter("delete_product").await?;
        let mut records = lock(&self.records);
        let before = records.products.len();
        records.products.retain(|p| &p.id != id);
        if records.products.len() == before {
            return Err(ApiError::NotFound(format!("products/{id}")));
        }
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.enter("list_orders").await?;
        let orders = lock(&self.records).orders.clone();
        self.reply("list_orders").await;
        Ok(orders)
    }

    async fn list_orders_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, ApiError> {
        self.enter("list_orders_by_user").await?;
        Ok(lock(&self.records)
            .orders
            .iter()
            .filter(|o| &o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        self.enter("create_order").await?;
        let mut records = lock(&self.records);
        let id = OrderId::new(records.next_id("o"));
        let order = order.clone().with_id(id);
        records.orders.push(order.clone());
        Ok(order)
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.enter("update_order_status").await?;
        let mut records = lock(&self.records);
        let order = records
            .orders
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("orders/{id}")))?;
        order.status = status;
        Ok(order.clone())
    }

    async fn get_user(&self, id: &UserId) -> Result<Profile, ApiError> {
        self.enter("get_user").await?;
        lock(&self.records)
            .users
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("users/{id}")))
    }

    async fn create_user(&self, profile: &Profile) -> Result<Profile, ApiError> {
        self.enter("create_user").await?;
        lock(&self.records)
            .users
            .insert(profile.id.clone(), profile.clone());
        Ok(profile.clone())
    }

    async fn update_user(&self, id: &UserId, patch: &ProfilePatch) -> Result<Profile, ApiError> {
        self.enter("update_user").await?;
        let mut records = lock(&self.records);
        let profile = records
            .users
            .get_mut(id)
            .ok_or_else(|| ApiError::NotFound(format!("users/{id}")))?;
        patch.apply(profile);
        Ok(profile.clone())
    }
}

//! REST implementation of [`DataApi`].
//!
//! Resource layout:
//!
//! | resource | operations |
//! |---|---|
//! | `/categories` | `GET` |
//! | `/products`, `/products/{id}` | `GET`, `POST`, `PATCH`, `DELETE` |
//! | `/orders`, `/orders?userId=`, `/orders/{id}` | `GET`, `POST`, `PATCH` |
//! | `/users/{id}`, `/users` | `GET`, `POST`, `PATCH` |

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use shopfront_core::{
    Category, NewOrder, NewProduct, Order, OrderId, OrderStatus, Product, ProductId, ProductPatch,
    Profile, ProfilePatch, UserId,
};

use crate::cache::{CacheKey, CacheValue};
use crate::{ApiConfig, ApiError, DataApi};

/// Longest slice of an error body kept in [`ApiError::Status`].
const ERROR_BODY_LIMIT: usize = 200;

// =============================================================================
// RestClient
// =============================================================================

/// Client for the REST data store.
///
/// Category and product listings are cached for the configured TTL, if any.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<RestClientInner>,
}

struct RestClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl RestClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        let cache = config.catalog_cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(16)
                .time_to_live(ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(RestClientInner {
                client,
                base_url: config.base_url.clone(),
                token: config.token.clone(),
                cache,
            }),
        })
    }

    /// Build a resource URL from path segments.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.inner.client.request(method, url);
        match &self.inner.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, builder: RequestBuilder, resource: &str) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(resource.to_string()));
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                resource,
                body = %body.chars().take(500).collect::<String>(),
                "Data store returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url, resource: &str) -> Result<T, ApiError> {
        let body = self.send(self.request(Method::GET, url), resource).await?;
        parse_body(&body, resource)
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        url: Url,
        payload: &B,
        resource: &str,
    ) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let body = self
            .send(self.request(method, url).json(payload), resource)
            .await?;
        parse_body(&body, resource)
    }

    fn invalidate_products(&self) {
        if let Some(cache) = &self.inner.cache {
            cache.invalidate_all();
        }
    }
}

/// Parse a JSON body, logging the raw text on failure.
fn parse_body<T: DeserializeOwned>(body: &str, resource: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        tracing::error!(
            error = %e,
            resource,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse data store response"
        );
        ApiError::Parse(e)
    })
}

#[derive(Serialize)]
struct StatusUpdate {
    status: OrderStatus,
}

#[async_trait]
impl DataApi for RestClient {
    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(cache) = &self.inner.cache
            && let Some(CacheValue::Categories(categories)) = cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self
            .get_json(self.url(&["categories"])?, "categories")
            .await?;

        if let Some(cache) = &self.inner.cache {
            cache
                .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
                .await;
        }
        Ok(categories)
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(cache) = &self.inner.cache
            && let Some(CacheValue::Products(products)) = cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json(self.url(&["products"])?, "products").await?;

        if let Some(cache) = &self.inner.cache {
            cache
                .insert(CacheKey::Products, CacheValue::Products(products.clone()))
                .await;
        }
        Ok(products)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let resource = format!("products/{id}");
        self.get_json(self.url(&["products", id.as_str()])?, &resource)
            .await
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        let created = self
            .send_json(Method::POST, self.url(&["products"])?, product, "products")
            .await?;
        self.invalidate_products();
        Ok(created)
    }

    #[instrument(skip(self, patch), fields(product_id = %id))]
    async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ApiError> {
        let resource = format!("products/{id}");
        let updated = self
            .send_json(
                Method::PATCH,
                self.url(&["products", id.as_str()])?,
                patch,
                &resource,
            )
            .await?;
        self.invalidate_products();
        Ok(updated)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_product(&self, id: &ProductId) -> Result<(), ApiError> {
        let resource = format!("products/{id}");
        let url = self.url(&["products", id.as_str()])?;
        self.send(self.request(Method::DELETE, url), &resource)
            .await?;
        self.invalidate_products();
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_json(self.url(&["orders"])?, "orders").await
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn list_orders_by_user(&self, user_id: &UserId) -> Result<Vec<Order>, ApiError> {
        let mut url = self.url(&["orders"])?;
        url.query_pairs_mut().append_pair("userId", user_id.as_str());
        self.get_json(url, "orders").await
    }

    #[instrument(skip(self, order), fields(user_id = %order.user_id, total = %order.total))]
    async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        self.send_json(Method::POST, self.url(&["orders"])?, order, "orders")
            .await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        let resource = format!("orders/{id}");
        self.send_json(
            Method::PATCH,
            self.url(&["orders", id.as_str()])?,
            &StatusUpdate { status },
            &resource,
        )
        .await
    }

    #[instrument(skip(self), fields(user_id = %id))]
    async fn get_user(&self, id: &UserId) -> Result<Profile, ApiError> {
        let resource = format!("users/{id}");
        self.get_json(self.url(&["users", id.as_str()])?, &resource)
            .await
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    async fn create_user(&self, profile: &Profile) -> Result<Profile, ApiError> {
        self.send_json(Method::POST, self.url(&["users"])?, profile, "users")
            .await
    }

    #[instrument(skip(self, patch), fields(user_id = %id))]
    async fn update_user(&self, id: &UserId, patch: &ProfilePatch) -> Result<Profile, ApiError> {
        let resource = format!("users/{id}");
        self.send_json(
            Method::PATCH,
            self.url(&["users", id.as_str()])?,
            patch,
            &resource,
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(base: &str) -> RestClient {
        RestClient::new(&ApiConfig::new(Url::parse(base).unwrap())).unwrap()
    }

    #[test]
    fn test_url_joins_segments() {
        let c = client("http://localhost:3008");
        assert_eq!(
            c.url(&["products", "p1"]).unwrap().as_str(),
            "http://localhost:3008/products/p1"
        );
    }

    #[test]
    fn test_url_keeps_base_path() {
        let c = client("http://localhost:3008/api/");
        assert_eq!(
            c.url(&["users", "u1"]).unwrap().as_str(),
            "http://localhost:3008/api/users/u1"
        );
    }

    #[test]
    fn test_url_escapes_ids() {
        let c = client("http://localhost:3008");
        assert_eq!(
            c.url(&["users", "a/b"]).unwrap().as_str(),
            "http://localhost:3008/users/a%2Fb"
        );
    }

    #[test]
    fn test_status_update_body() {
        let body = serde_json::to_value(StatusUpdate {
            status: OrderStatus::Shipped,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "status": "Shipped" }));
    }

    #[test]
    fn test_parse_body_error_is_parse() {
        let result: Result<Vec<Product>, _> = parse_body("not json", "products");
        assert!(matches!(result, Err(ApiError::Parse(_))));
    }

    #[test]
    fn test_catalog_not_cached_by_default() {
        let c = client("http://localhost:3008");
        assert!(c.inner.cache.is_none());
        c.invalidate_products();
    }

    #[test]
    fn test_catalog_cached_when_ttl_set() {
        let mut config = ApiConfig::new(Url::parse("http://localhost:3008").unwrap());
        config.catalog_cache_ttl = Some(Duration::from_secs(60));
        let c = RestClient::new(&config).unwrap();
        assert!(c.inner.cache.is_some());
        c.invalidate_products();
    }
}

//! Shopfront remote data access.
//!
//! # Architecture
//!
//! - [`DataApi`] is the contract the storefront and admin components consume:
//!   create/read/update/delete over categories, products, orders and user
//!   profiles, with no transactions across entities.
//! - [`RestClient`] implements it over JSON/HTTP with `reqwest`.
//! - Category and product listings are cached in memory via `moka` and
//!   invalidated on every product mutation.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_api::{ApiConfig, DataApi, RestClient};
//!
//! let client = RestClient::new(&ApiConfig::from_env()?)?;
//! let products = client.list_products().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod cache;
mod client;
pub mod config;
mod error;
mod store;

pub use client::RestClient;
pub use config::{ApiConfig, ConfigError};
pub use error::ApiError;
pub use store::DataApi;

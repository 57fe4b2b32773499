//! Shopfront Storefront library.
//!
//! The client-side state synchronization core of the storefront: the cart,
//! the identity-to-profile binding and order placement, plus the catalog
//! filter and the customer account views built on them.
//!
//! # Architecture
//!
//! - [`Session`] is the explicit context object: it owns the [`CartStore`],
//!   the [`IdentityBinding`] and the data-store handle for one browsing
//!   session.
//! - Remote data access goes through [`shopfront_api::DataApi`]; the
//!   identity provider is the [`IdentityProvider`] trait.
//! - Remote failures are converted to [`AppError`] and surfaced as user
//!   notices; nothing here is fatal to the process.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod services;
pub mod state;

pub use cart::{CartLine, CartStore};
pub use error::{AppError, Notice, NoticeLevel, Precondition, Route};
pub use services::identity::{
    BindOutcome, IdentityBinding, IdentityListener, IdentityProvider, PresetIdentityProvider,
    ProviderError,
};
pub use state::Session;

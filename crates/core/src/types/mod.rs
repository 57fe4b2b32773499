//! Core types for Shopfront.
//!
//! This module provides type-safe wrappers and the records exchanged with the
//! remote data store.

pub mod catalog;
pub mod id;
pub mod identity;
pub mod order;
pub mod price;
pub mod profile;
pub mod status;

pub use catalog::{Category, NewProduct, Product, ProductPatch};
pub use id::*;
pub use identity::Identity;
pub use order::{NewOrder, Order, OrderLine, sort_newest_first};
pub use price::Price;
pub use profile::{Address, AddressError, NewAddress, Profile, ProfilePatch, WishlistChange};
pub use status::{OrderStatus, StatusTransitionError};

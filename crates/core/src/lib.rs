//! Shopfront Core - Shared domain types.
//!
//! This crate provides the records exchanged between the Shopfront components:
//! - `storefront` - Identity binding, cart, checkout and catalog browsing
//! - `admin` - Order polling, status transitions and product management
//! - `cli` - Command-line surface over both
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, prices, the order status machine and domain records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

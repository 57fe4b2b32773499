//! Shopfront Admin library.
//!
//! The operator console: a polled order list with forward-only status
//! transitions, and product management.
//!
//! # Architecture
//!
//! - [`OrdersConsole`] holds the latest [`OrderBoard`] and publishes it on a
//!   `watch` channel.
//! - [`start_polling`] refreshes the console on a fixed period until its
//!   [`PollHandle`] is cancelled or dropped.
//! - [`ProductsConsole`] validates [`ProductForm`]s locally before sending
//!   and re-fetches the product list after every change.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod orders;
pub mod poller;
pub mod products;

pub use config::AdminConfig;
pub use error::AdminError;
pub use orders::{OrderBoard, OrdersConsole, available_action};
pub use poller::{PollHandle, start_polling};
pub use products::{ProductForm, ProductsConsole};

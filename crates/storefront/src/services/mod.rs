//! Services that talk to external collaborators.
//!
//! # Services
//!
//! - `identity` - Identity provider abstraction and the identity-to-profile binding

pub mod identity;

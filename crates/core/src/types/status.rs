//! Order status state machine.
//!
//! ```text
//! On Process ──▶ Shipped ──▶ Delivered
//! ```
//!
//! Transitions are strictly forward and one step at a time. `Delivered` is
//! terminal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fulfilment status of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Accepted and awaiting shipment.
    #[default]
    #[serde(rename = "On Process")]
    OnProcess,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer.
    Delivered,
}

/// Rejected status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatusTransitionError {
    /// The order is already delivered; nothing follows.
    #[error("order is already {0} and cannot change status")]
    Terminal(OrderStatus),
    /// The requested status is not the single next step.
    #[error("cannot move order from {from} to {to}")]
    NotNextStep {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::OnProcess, Self::Shipped, Self::Delivered];

    /// The single forward transition offered from this status, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::OnProcess => Some(Self::Shipped),
            Self::Shipped => Some(Self::Delivered),
            Self::Delivered => None,
        }
    }

    /// Whether no further transition exists.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// Check that `target` is the single next step from this status.
    ///
    /// # Errors
    ///
    /// Returns [`StatusTransitionError::Terminal`] from `Delivered` and
    /// [`StatusTransitionError::NotNextStep`] for backwards, same-state or
    /// skipping transitions.
    pub fn transition_to(self, target: Self) -> Result<Self, StatusTransitionError> {
        match self.next() {
            None => Err(StatusTransitionError::Terminal(self)),
            Some(next) if next == target => Ok(next),
            Some(_) => Err(StatusTransitionError::NotNextStep {
                from: self,
                to: target,
            }),
        }
    }

    /// The label used on the wire and in listings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OnProcess => "On Process",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "On Process" | "on_process" => Ok(Self::OnProcess),
            "Shipped" | "shipped" => Ok(Self::Shipped),
            "Delivered" | "delivered" => Ok(Self::Delivered),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

//! Admin order list and status transitions.
//!
//! The list is never edited optimistically. It is replaced by a re-fetch
//! after every successful transition and on each poll tick, so it always
//! shows what the store reports. Subscribers receive every new
//! [`OrderBoard`] over a `watch` channel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument};

use shopfront_api::DataApi;
use shopfront_core::{Order, OrderId, OrderStatus, StatusTransitionError, sort_newest_first};

use crate::error::{AdminError, Result};

/// The single forward status offered for `order`, if any.
#[must_use]
pub const fn available_action(order: &Order) -> Option<OrderStatus> {
    order.status.next()
}

/// Snapshot of the order list as last fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderBoard {
    /// Orders, newest first.
    pub orders: Vec<Order>,
    /// Whether at least one fetch has succeeded.
    pub loaded: bool,
    /// Message from the most recent failed fetch, cleared by the next success.
    pub last_error: Option<String>,
    /// When the list was last replaced.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl OrderBoard {
    #[must_use]
    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| &o.id == id)
    }

    /// Number of orders in each status, in lifecycle order.
    #[must_use]
    pub fn counts(&self) -> [(OrderStatus, usize); 3] {
        OrderStatus::ALL.map(|status| {
            let count = self.orders.iter().filter(|o| o.status == status).count();
            (status, count)
        })
    }
}

/// The operator's view of all orders.
///
/// Cheap to clone; clones share the same board.
#[derive(Clone)]
pub struct OrdersConsole {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    api: Arc<dyn DataApi>,
    board: watch::Sender<OrderBoard>,
    /// Held from fetch to publish so an older response never replaces a newer one.
    refreshing: Mutex<()>,
}

impl OrdersConsole {
    /// Create a console with an empty, unloaded board.
    #[must_use]
    pub fn new(api: Arc<dyn DataApi>) -> Self {
        let (board, _) = watch::channel(OrderBoard::default());
        Self {
            inner: Arc::new(ConsoleInner {
                api,
                board,
                refreshing: Mutex::new(()),
            }),
        }
    }

    /// The current board.
    #[must_use]
    pub fn board(&self) -> OrderBoard {
        self.inner.board.borrow().clone()
    }

    /// Receive every new board.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<OrderBoard> {
        self.inner.board.subscribe()
    }

    /// Re-fetch all orders and publish them newest first.
    ///
    /// Refreshes run one at a time, each publishing before the next fetches.
    ///
    /// # Errors
    ///
    /// Returns the remote failure. The previous orders stay on the board and
    /// the failure is recorded in [`OrderBoard::last_error`].
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<()> {
        let _guard = self.inner.refreshing.lock().await;

        match self.inner.api.list_orders().await {
            Ok(mut orders) => {
                sort_newest_first(&mut orders);
                debug!(count = orders.len(), "Order list refreshed");
                self.inner.board.send_modify(|board| {
                    board.orders = orders;
                    board.loaded = true;
                    board.last_error = None;
                    board.refreshed_at = Some(Utc::now());
                });
                Ok(())
            }
            Err(e) => {
                let err = AdminError::from(e).reported();
                let message = err.user_message();
                self.inner.board.send_modify(|board| {
                    board.last_error = Some(message);
                });
                Err(err)
            }
        }
    }

    /// Move an order one step forward.
    ///
    /// # Errors
    ///
    /// See [`transition`](Self::transition).
    pub async fn advance(&self, id: &OrderId) -> Result<Order> {
        let current = self.current_status(id)?;
        let next = current
            .next()
            .ok_or(StatusTransitionError::Terminal(current))?;
        self.transition(id, next).await
    }

    /// Set an order's status to `target`.
    ///
    /// Only the single forward step from the displayed status is accepted;
    /// anything else is rejected before a request is made. After the store
    /// accepts the change the list is re-fetched. A failed re-fetch is
    /// recorded on the board but does not fail the transition.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::NotFound` if the order is not on the board,
    /// `AdminError::Transition` for a disallowed target, or the remote
    /// failure, in which case the board is unchanged.
    #[instrument(skip(self), fields(order_id = %id, target = %target))]
    pub async fn transition(&self, id: &OrderId, target: OrderStatus) -> Result<Order> {
        let current = self.current_status(id)?;
        let target = current.transition_to(target)?;

        let updated = self
            .inner
            .api
            .update_order_status(id, target)
            .await
            .map_err(|e| AdminError::from(e).reported())?;
        info!(from = %current, to = %updated.status, "Order status changed");

        if let Err(err) = self.refresh().await {
            debug!(error = %err, "Refresh after transition failed");
        }
        Ok(updated)
    }

    fn current_status(&self, id: &OrderId) -> Result<OrderStatus> {
        self.inner
            .board
            .borrow()
            .order(id)
            .map(|o| o.status)
            .ok_or_else(|| AdminError::NotFound(format!("orders/{id}")))
    }
}

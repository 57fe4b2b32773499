//! Periodic order list refresh.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::orders::OrdersConsole;

/// Refresh `console` every `period`, starting immediately.
///
/// A failed refresh is logged and recorded on the board; the loop keeps
/// going. Ticks missed while a refresh is in flight are skipped rather than
/// run back to back. The loop runs until the returned handle is cancelled
/// or dropped.
///
/// # Panics
///
/// Panics if `period` is zero.
#[must_use]
pub fn start_polling(console: OrdersConsole, period: Duration) -> PollHandle {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let task = tokio::spawn(async move {
        loop {
            interval.tick().await;
            if let Err(err) = console.refresh().await {
                warn!(error = %err, "Order poll failed");
            }
        }
    });

    debug!(?period, "Order polling started");
    PollHandle { task }
}

/// Handle to a running poll loop.
///
/// Dropping the handle cancels the loop, so a torn-down view never leaves a
/// recurring task behind.
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop polling.
    pub fn cancel(self) {
        drop(self);
    }

    /// Whether the loop has stopped.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
        debug!("Order polling stopped");
    }
}

//! Integration tests for the admin order list, status transitions and the
//! poll loop.
//!
//! Poll tests run on paused time, so the 5 second period elapses instantly.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use shopfront_admin::{AdminError, OrdersConsole, available_action, start_polling};
use shopfront_core::{OrderId, OrderStatus, StatusTransitionError};
use shopfront_integration_tests::{MemoryStore, march, order, shared};

const PERIOD: Duration = Duration::from_secs(5);

fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new().with_orders(vec![
        order("o1", "u1", OrderStatus::OnProcess, march(1)),
        order("o2", "u2", OrderStatus::Shipped, march(3)),
        order("o3", "u1", OrderStatus::Delivered, march(2)),
    ]))
}

async fn loaded(store: &Arc<MemoryStore>) -> OrdersConsole {
    let console = OrdersConsole::new(shared(store));
    console.refresh().await.unwrap();
    console
}

fn status_of(console: &OrdersConsole, id: &str) -> OrderStatus {
    console.board().order(&OrderId::new(id)).unwrap().status
}

// =============================================================================
// Order list
// =============================================================================

#[tokio::test]
async fn test_refresh_lists_newest_first() {
    let store = store();
    let console = OrdersConsole::new(shared(&store));
    assert!(!console.board().loaded);

    console.refresh().await.unwrap();

    let board = console.board();
    assert!(board.loaded);
    assert!(board.refreshed_at.is_some());
    let ids: Vec<&str> = board.orders.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(ids, ["o2", "o3", "o1"]);
    let actions: Vec<_> = board.orders.iter().map(available_action).collect();
    assert_eq!(
        actions,
        [Some(OrderStatus::Delivered), None, Some(OrderStatus::Shipped)]
    );
}

#[tokio::test]
async fn test_failed_refresh_keeps_list_and_records_error() {
    let store = store();
    let console = loaded(&store).await;
    store.fail("list_orders");

    let err = console.refresh().await.unwrap_err();

    assert!(err.is_retryable());
    let board = console.board();
    assert_eq!(board.orders.len(), 3);
    assert_eq!(board.last_error.as_deref(), Some("External service error"));

    store.recover("list_orders");
    console.refresh().await.unwrap();
    assert!(console.board().last_error.is_none());
}

// =============================================================================
// Transitions
// =============================================================================

#[tokio::test]
async fn test_advance_moves_one_step_and_refetches() {
    let store = store();
    let console = loaded(&store).await;
    let lists = store.calls("list_orders");

    let updated = console.advance(&OrderId::new("o1")).await.unwrap();

    assert_eq!(updated.status, OrderStatus::Shipped);
    assert_eq!(status_of(&console, "o1"), OrderStatus::Shipped);
    assert_eq!(store.calls("list_orders"), lists + 1);

    console.advance(&OrderId::new("o1")).await.unwrap();
    assert_eq!(status_of(&console, "o1"), OrderStatus::Delivered);
}

#[tokio::test(start_paused = true)]
async fn test_stale_refresh_cannot_overwrite_transition() {
    let store = store();
    let console = loaded(&store).await;

    // A poll reads the old status, then its response is held up.
    store.delay_next_reply("list_orders", Duration::from_millis(100));
    let poll = tokio::spawn({
        let console = console.clone();
        async move { console.refresh().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    let updated = console.advance(&OrderId::new("o1")).await.unwrap();
    poll.await.unwrap().unwrap();

    assert_eq!(updated.status, OrderStatus::Shipped);
    assert_eq!(status_of(&console, "o1"), OrderStatus::Shipped);
    assert_eq!(store.calls("update_order_status"), 1);
}

#[tokio::test]
async fn test_delivered_has_no_transition() {
    let store = store();
    let console = loaded(&store).await;

    let err = console.advance(&OrderId::new("o3")).await.unwrap_err();

    assert!(matches!(
        err,
        AdminError::Transition(StatusTransitionError::Terminal(OrderStatus::Delivered))
    ));
    assert_eq!(store.calls("update_order_status"), 0);
}

#[tokio::test]
async fn test_skipping_and_reverse_transitions_rejected_before_request() {
    let store = store();
    let console = loaded(&store).await;

    let skip = console
        .transition(&OrderId::new("o1"), OrderStatus::Delivered)
        .await
        .unwrap_err();
    assert!(matches!(
        skip,
        AdminError::Transition(StatusTransitionError::NotNextStep { .. })
    ));

    let reverse = console
        .transition(&OrderId::new("o2"), OrderStatus::OnProcess)
        .await
        .unwrap_err();
    assert!(matches!(
        reverse,
        AdminError::Transition(StatusTransitionError::NotNextStep {
            from: OrderStatus::Shipped,
            to: OrderStatus::OnProcess,
        })
    ));

    assert_eq!(store.calls("update_order_status"), 0);
    assert_eq!(status_of(&console, "o1"), OrderStatus::OnProcess);
    assert_eq!(status_of(&console, "o2"), OrderStatus::Shipped);
}

#[tokio::test]
async fn test_rejected_transition_leaves_status_unchanged() {
    let store = store();
    let console = loaded(&store).await;
    let lists = store.calls("list_orders");
    store.fail("update_order_status");

    let err = console.advance(&OrderId::new("o1")).await.unwrap_err();

    assert!(matches!(err, AdminError::Remote(_)));
    assert!(err.is_retryable());
    assert_eq!(status_of(&console, "o1"), OrderStatus::OnProcess);
    assert_eq!(store.calls("list_orders"), lists);
}

#[tokio::test]
async fn test_unknown_order_not_found() {
    let store = store();
    let console = loaded(&store).await;

    let err = console.advance(&OrderId::new("o9")).await.unwrap_err();

    assert!(matches!(err, AdminError::NotFound(_)));
}

// =============================================================================
// Poll loop
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_poll_refreshes_on_each_period() {
    let store = store();
    let console = OrdersConsole::new(shared(&store));
    let _handle = start_polling(console.clone(), PERIOD);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(store.calls("list_orders"), 1);
    assert!(console.board().loaded);

    store.set_order_status(&OrderId::new("o1"), OrderStatus::Shipped);
    tokio::time::sleep(PERIOD).await;
    assert_eq!(store.calls("list_orders"), 2);
    assert_eq!(status_of(&console, "o1"), OrderStatus::Shipped);

    tokio::time::sleep(PERIOD * 3).await;
    assert_eq!(store.calls("list_orders"), 5);
}

#[tokio::test(start_paused = true)]
async fn test_poll_publishes_to_subscribers() {
    let store = store();
    let console = OrdersConsole::new(shared(&store));
    let mut rx = console.subscribe();
    let _handle = start_polling(console, PERIOD);

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().orders.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_poll_survives_failures() {
    let store = store();
    store.fail("list_orders");
    let console = OrdersConsole::new(shared(&store));
    let handle = start_polling(console.clone(), PERIOD);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(console.board().last_error.is_some());
    assert!(!console.board().loaded);

    store.recover("list_orders");
    tokio::time::sleep(PERIOD).await;
    assert!(console.board().loaded);
    assert!(console.board().last_error.is_none());
    assert!(!handle.is_finished());
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_poll_stops() {
    let store = store();
    let handle = start_polling(OrdersConsole::new(shared(&store)), PERIOD);
    tokio::time::sleep(Duration::from_millis(100)).await;

    handle.cancel();
    tokio::time::sleep(PERIOD * 4).await;

    assert_eq!(store.calls("list_orders"), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_poll_handle_stops() {
    let store = store();
    {
        let _handle = start_polling(OrdersConsole::new(shared(&store)), PERIOD);
        tokio::time::sleep(PERIOD + Duration::from_millis(100)).await;
    }
    let calls = store.calls("list_orders");
    assert_eq!(calls, 2);

    tokio::time::sleep(PERIOD * 4).await;
    assert_eq!(store.calls("list_orders"), calls);
}

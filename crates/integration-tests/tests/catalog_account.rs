//! Integration tests for catalog loading, the wishlist and the dashboard.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use shopfront_core::{Identity, OrderStatus, ProductId, Profile, UserId, WishlistChange};
use shopfront_integration_tests::{
    MemoryStore, ScriptedIdentityProvider, category, march, order, product, shared,
};
use shopfront_storefront::catalog::{CatalogQuery, SortKey};
use shopfront_storefront::{AppError, Precondition, Session};

fn catalog_store() -> MemoryStore {
    let mut case = product("p3", "case", 1500, 8);
    case.category = "Accessories".to_string();
    MemoryStore::new()
        .with_products(vec![
            product("p1", "Pixel 8", 69_900, 3),
            product("p2", "iPhone 15", 99_900, 0),
            case,
        ])
        .with_categories(vec![category("c1", "Phones"), category("c2", "Accessories")])
}

async fn signed_in(store: MemoryStore, wishlist: &[&str]) -> (Arc<MemoryStore>, Session) {
    let mut profile = Profile::for_identity(&Identity::new("u1"));
    profile.wishlist = wishlist.iter().copied().map(ProductId::new).collect();
    let store = Arc::new(store.with_user(profile));
    let session = Session::new(shared(&store), Arc::new(ScriptedIdentityProvider::new()));
    session
        .binding()
        .observe(Some(Identity::new("u1")))
        .await
        .unwrap();
    (store, session)
}

fn names(products: &[shopfront_core::Product]) -> Vec<&str> {
    products.iter().map(|p| p.name.as_str()).collect()
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_load_catalog_fetches_products_and_categories() {
    let store = Arc::new(catalog_store());
    let session = Session::new(shared(&store), Arc::new(ScriptedIdentityProvider::new()));

    let catalog = session.load_catalog().await.unwrap();

    assert_eq!(catalog.products.len(), 3);
    assert_eq!(catalog.category_names(), ["Phones", "Accessories"]);
    assert_eq!(store.calls("list_products"), 1);
    assert_eq!(store.calls("list_categories"), 1);

    assert_eq!(names(&catalog.query(&CatalogQuery::new())), ["case", "iPhone 15", "Pixel 8"]);
    assert_eq!(
        names(&catalog.query(&CatalogQuery::new().category("Phones").sort(SortKey::PriceDesc))),
        ["iPhone 15", "Pixel 8"]
    );
    assert!(!catalog.products[1].is_purchasable());
}

#[tokio::test]
async fn test_load_catalog_failure_is_retryable() {
    let store = Arc::new(catalog_store());
    store.fail("list_categories");
    let session = Session::new(shared(&store), Arc::new(ScriptedIdentityProvider::new()));

    let err = session.load_catalog().await.unwrap_err();

    assert!(matches!(err, AppError::Remote(_)));
    assert!(err.is_retryable());
}

// =============================================================================
// Wishlist
// =============================================================================

#[tokio::test]
async fn test_toggle_wishlist_adds_then_removes() {
    let (store, session) = signed_in(catalog_store(), &[]).await;
    let p1 = ProductId::new("p1");

    assert_eq!(session.toggle_wishlist(&p1).await.unwrap(), WishlistChange::Added);
    assert!(session.is_in_wishlist(&p1));
    assert_eq!(store.user(&UserId::new("u1")).unwrap().wishlist, [p1.clone()]);

    assert_eq!(session.toggle_wishlist(&p1).await.unwrap(), WishlistChange::Removed);
    assert!(!session.is_in_wishlist(&p1));
    assert!(store.user(&UserId::new("u1")).unwrap().wishlist.is_empty());
}

#[tokio::test]
async fn test_remove_from_wishlist() {
    let (store, session) = signed_in(catalog_store(), &["p1", "p3"]).await;

    session
        .remove_from_wishlist(&ProductId::new("p1"))
        .await
        .unwrap();

    assert_eq!(
        store.user(&UserId::new("u1")).unwrap().wishlist,
        [ProductId::new("p3")]
    );
    assert_eq!(
        session.binding().profile().unwrap().wishlist,
        [ProductId::new("p3")]
    );
}

#[tokio::test]
async fn test_wishlist_requires_sign_in() {
    let store = Arc::new(catalog_store());
    let session = Session::new(shared(&store), Arc::new(ScriptedIdentityProvider::new()));
    let p1 = ProductId::new("p1");

    let err = session.toggle_wishlist(&p1).await.unwrap_err();

    assert!(matches!(err, AppError::Precondition(Precondition::NotSignedIn)));
    assert!(!session.is_in_wishlist(&p1));
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_failed_wishlist_update_keeps_profile() {
    let (store, session) = signed_in(catalog_store(), &["p1"]).await;
    store.fail("update_user");

    let result = session.toggle_wishlist(&ProductId::new("p3")).await;

    assert!(matches!(result, Err(AppError::Remote(_))));
    assert_eq!(
        session.binding().profile().unwrap().wishlist,
        [ProductId::new("p1")]
    );
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_lists_wishlist_and_own_orders_newest_first() {
    let store = catalog_store().with_orders(vec![
        order("o1", "u1", OrderStatus::Delivered, march(1)),
        order("o2", "u2", OrderStatus::OnProcess, march(2)),
        order("o3", "u1", OrderStatus::Shipped, march(3)),
    ]);
    let (_, session) = signed_in(store, &["p3", "p1"]).await;

    let dashboard = session.load_dashboard().await.unwrap();

    let wishlist: Vec<&str> = dashboard.wishlist.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(wishlist, ["p1", "p3"]);
    let orders: Vec<&str> = dashboard.orders.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(orders, ["o3", "o1"]);
    assert_eq!(dashboard.profile.id, UserId::new("u1"));
}

#[tokio::test]
async fn test_dashboard_requires_sign_in() {
    let store = Arc::new(catalog_store());
    let session = Session::new(shared(&store), Arc::new(ScriptedIdentityProvider::new()));

    let err = session.load_dashboard().await.unwrap_err();

    assert_eq!(err.redirect(), Some(shopfront_storefront::Route::SignIn));
}

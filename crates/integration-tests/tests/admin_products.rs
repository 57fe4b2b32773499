//! Integration tests for admin product management.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use shopfront_admin::{AdminError, ProductForm, ProductsConsole};
use shopfront_core::{Price, ProductId};
use shopfront_integration_tests::{MemoryStore, category, product, shared};

async fn loaded() -> (Arc<MemoryStore>, ProductsConsole) {
    let store = Arc::new(
        MemoryStore::new()
            .with_products(vec![product("p1", "Pixel 8", 69_900, 3)])
            .with_categories(vec![category("c1", "Phones"), category("c2", "Tablets")]),
    );
    let mut console = ProductsConsole::new(shared(&store));
    console.load().await.unwrap();
    (store, console)
}

fn tablet_form() -> ProductForm {
    ProductForm {
        name: "iPad Mini".to_string(),
        category: "Tablets".to_string(),
        price: Price::from_cents(49_900),
        stock: 7,
        description: "Small tablet".to_string(),
        image: String::new(),
    }
}

#[tokio::test]
async fn test_create_product_then_refetch() {
    let (store, mut console) = loaded().await;

    let created = console.save_product(None, tablet_form()).await.unwrap();

    assert_eq!(created.name, "iPad Mini");
    assert_eq!(store.calls("create_product"), 1);
    assert_eq!(store.calls("list_products"), 2);
    assert_eq!(console.products().len(), 2);
    assert!(console.products().iter().any(|p| p.id == created.id));
}

#[tokio::test]
async fn test_edit_product_sends_update() {
    let (store, mut console) = loaded().await;
    let p1 = ProductId::new("p1");
    let mut form = ProductForm::from_product(&console.products()[0]);
    form.price = Price::from_cents(59_900);
    form.stock = 0;

    let updated = console.save_product(Some(&p1), form).await.unwrap();

    assert_eq!(updated.price, Price::from_cents(59_900));
    assert_eq!(store.calls("update_product"), 1);
    assert_eq!(store.calls("create_product"), 0);
    let stored = store.products().into_iter().find(|p| p.id == p1).unwrap();
    assert_eq!(stored.stock, 0);
    assert_eq!(stored.name, "Pixel 8");
    assert_eq!(console.products()[0], stored);
}

#[tokio::test]
async fn test_invalid_form_sends_nothing() {
    let (store, mut console) = loaded().await;
    let calls = store.total_calls();

    let mut form = tablet_form();
    form.category = "Toasters".to_string();
    let err = console.save_product(None, form).await.unwrap_err();

    assert!(matches!(err, AdminError::Validation(_)));
    assert_eq!(err.user_message(), "unknown category: Toasters");
    assert_eq!(store.total_calls(), calls);
}

#[tokio::test]
async fn test_delete_product_then_refetch() {
    let (store, mut console) = loaded().await;

    console.delete_product(&ProductId::new("p1")).await.unwrap();

    assert!(console.products().is_empty());
    assert!(store.products().is_empty());

    let err = console
        .delete_product(&ProductId::new("p1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AdminError::NotFound(_)));
}

#[tokio::test]
async fn test_failed_load_keeps_previous_lists() {
    let (store, mut console) = loaded().await;
    store.fail("list_categories");

    assert!(console.load().await.is_err());

    assert_eq!(console.products().len(), 1);
    assert_eq!(console.categories().len(), 2);
}

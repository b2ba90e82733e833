mod common;

use uuid::Uuid;

use common::{seed_verified_account, Harness};
use stockroom::error::ApiError;
use stockroom::products::dto::{PatchProductRequest, ProductRequest};
use stockroom::products::services;
use stockroom::products::ProductStore;

fn product_req(sku: &str) -> ProductRequest {
    ProductRequest {
        name: "Widget".into(),
        description: "A widget".into(),
        sku: sku.into(),
        manufacturer: "Acme".into(),
        quantity: 5,
    }
}

fn empty_patch() -> PatchProductRequest {
    PatchProductRequest {
        name: None,
        description: None,
        sku: None,
        manufacturer: None,
        quantity: None,
    }
}

#[tokio::test]
async fn create_assigns_owner_and_timestamps() {
    let h = Harness::new();
    let alice = seed_verified_account(&h, "alice@example.com").await;

    let product = services::create(&h.state, &alice, product_req("SKU-1"))
        .await
        .unwrap();

    assert_eq!(product.owner_id, alice.id);
    assert_eq!(product.date_added, product.date_last_updated);
    assert_eq!(services::get(&h.state, product.id).await.unwrap().sku, "SKU-1");
}

#[tokio::test]
async fn create_rejects_duplicate_sku_and_bad_quantity() {
    let h = Harness::new();
    let alice = seed_verified_account(&h, "alice@example.com").await;
    services::create(&h.state, &alice, product_req("SKU-1"))
        .await
        .unwrap();

    assert!(matches!(
        services::create(&h.state, &alice, product_req("SKU-1")).await,
        Err(ApiError::Conflict(_))
    ));

    let mut over = product_req("SKU-2");
    over.quantity = 101;
    assert!(matches!(
        services::create(&h.state, &alice, over).await,
        Err(ApiError::Validation(_))
    ));

    let mut under = product_req("SKU-3");
    under.quantity = -1;
    assert!(matches!(
        services::create(&h.state, &alice, under).await,
        Err(ApiError::Validation(_))
    ));

    assert!(!h.products.sku_exists("SKU-2").await.unwrap());
}

#[tokio::test]
async fn reads_are_public_and_miss_with_404() {
    let h = Harness::new();
    let alice = seed_verified_account(&h, "alice@example.com").await;
    let product = services::create(&h.state, &alice, product_req("SKU-1"))
        .await
        .unwrap();

    // No account involved in the read path at all.
    assert_eq!(services::get(&h.state, product.id).await.unwrap().id, product.id);
    assert!(matches!(
        services::get(&h.state, Uuid::new_v4()).await,
        Err(ApiError::NotFound(_))
    ));
}

#[tokio::test]
async fn replace_overwrites_everything_but_the_owner() {
    let h = Harness::new();
    let alice = seed_verified_account(&h, "alice@example.com").await;
    let product = services::create(&h.state, &alice, product_req("SKU-1"))
        .await
        .unwrap();

    let replacement = ProductRequest {
        name: "Gadget".into(),
        description: String::new(),
        sku: "SKU-9".into(),
        manufacturer: "Initech".into(),
        quantity: 0,
    };
    services::replace(&h.state, &alice, product.id, replacement)
        .await
        .unwrap();

    let stored = services::get(&h.state, product.id).await.unwrap();
    assert_eq!(stored.name, "Gadget");
    assert_eq!(stored.sku, "SKU-9");
    assert_eq!(stored.quantity, 0);
    assert_eq!(stored.owner_id, alice.id);
    assert_eq!(stored.date_added, product.date_added);
    assert!(stored.date_last_updated >= product.date_last_updated);
}

#[tokio::test]
async fn mutations_answer_missing_before_foreign() {
    let h = Harness::new();
    let alice = seed_verified_account(&h, "alice@example.com").await;
    let bob = seed_verified_account(&h, "bob@example.com").await;
    let product = services::create(&h.state, &alice, product_req("SKU-1"))
        .await
        .unwrap();

    // Unknown id: 404 regardless of who asks.
    assert!(matches!(
        services::replace(&h.state, &bob, Uuid::new_v4(), product_req("SKU-2")).await,
        Err(ApiError::NotFound(_))
    ));
    // Existing but foreign: 403.
    assert!(matches!(
        services::replace(&h.state, &bob, product.id, product_req("SKU-2")).await,
        Err(ApiError::Forbidden(_))
    ));
    assert!(matches!(
        services::patch(&h.state, &bob, product.id, empty_patch()).await,
        Err(ApiError::Forbidden(_))
    ));
    assert!(matches!(
        services::delete(&h.state, &bob, product.id).await,
        Err(ApiError::Forbidden(_))
    ));

    // Every denial left the product alone.
    assert_eq!(services::get(&h.state, product.id).await.unwrap().sku, "SKU-1");
}

#[tokio::test]
async fn replace_cannot_steal_another_products_sku() {
    let h = Harness::new();
    let alice = seed_verified_account(&h, "alice@example.com").await;
    let first = services::create(&h.state, &alice, product_req("SKU-1"))
        .await
        .unwrap();
    services::create(&h.state, &alice, product_req("SKU-2"))
        .await
        .unwrap();

    assert!(matches!(
        services::replace(&h.state, &alice, first.id, product_req("SKU-2")).await,
        Err(ApiError::Conflict(_))
    ));
    assert_eq!(services::get(&h.state, first.id).await.unwrap().sku, "SKU-1");

    // Keeping its own sku is not a conflict.
    services::replace(&h.state, &alice, first.id, product_req("SKU-1"))
        .await
        .unwrap();
}

#[tokio::test]
async fn patch_touches_only_the_supplied_fields() {
    let h = Harness::new();
    let alice = seed_verified_account(&h, "alice@example.com").await;
    let product = services::create(&h.state, &alice, product_req("SKU-1"))
        .await
        .unwrap();

    let mut patch = empty_patch();
    patch.quantity = Some(42);
    services::patch(&h.state, &alice, product.id, patch)
        .await
        .unwrap();

    let stored = services::get(&h.state, product.id).await.unwrap();
    assert_eq!(stored.quantity, 42);
    assert_eq!(stored.name, "Widget");
    assert_eq!(stored.sku, "SKU-1");
}

#[tokio::test]
async fn patch_validates_the_fields_it_is_given() {
    let h = Harness::new();
    let alice = seed_verified_account(&h, "alice@example.com").await;
    let product = services::create(&h.state, &alice, product_req("SKU-1"))
        .await
        .unwrap();
    services::create(&h.state, &alice, product_req("SKU-2"))
        .await
        .unwrap();

    let mut over = empty_patch();
    over.quantity = Some(101);
    assert!(matches!(
        services::patch(&h.state, &alice, product.id, over).await,
        Err(ApiError::Validation(_))
    ));

    let mut stolen = empty_patch();
    stolen.sku = Some("SKU-2".into());
    assert!(matches!(
        services::patch(&h.state, &alice, product.id, stolen).await,
        Err(ApiError::Conflict(_))
    ));

    let stored = services::get(&h.state, product.id).await.unwrap();
    assert_eq!(stored.quantity, 5);
    assert_eq!(stored.sku, "SKU-1");
}

#[tokio::test]
async fn delete_removes_the_product_for_its_owner() {
    let h = Harness::new();
    let alice = seed_verified_account(&h, "alice@example.com").await;
    let product = services::create(&h.state, &alice, product_req("SKU-1"))
        .await
        .unwrap();

    services::delete(&h.state, &alice, product.id).await.unwrap();
    assert!(matches!(
        services::get(&h.state, product.id).await,
        Err(ApiError::NotFound(_))
    ));
    assert!(matches!(
        services::delete(&h.state, &alice, product.id).await,
        Err(ApiError::NotFound(_))
    ));
}

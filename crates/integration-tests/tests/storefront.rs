//! End-to-end tests for the storefront over HTTP.

use shopfront_core::filter::INITIAL_VISIBLE;
use shopfront_integration_tests::{TestContext, sample_products};

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let ctx = TestContext::with_products(sample_products()).await;

    assert_eq!(ctx.get_text("/health").await, "ok");
    ctx.get_text("/health/ready").await;
}

// ============================================================================
// Listing
// ============================================================================

#[tokio::test]
async fn test_listing_search_and_category() {
    let ctx = TestContext::with_products(sample_products()).await;

    let body = ctx.get_text("/products?q=shoe").await;
    assert!(body.contains("Red Running Shoe"));
    assert!(body.contains("Green Trail Shoe"));
    assert!(!body.contains("Blue Hat"));

    let body = ctx.get_text("/products/results?category=hats").await;
    assert!(body.contains("Blue Hat"));
    assert!(!body.contains("Red Running Shoe"));
    assert!(body.contains(r#"id="product-grid""#));
}

#[tokio::test]
async fn test_listing_no_results() {
    let ctx = TestContext::with_products(sample_products()).await;

    let body = ctx.get_text("/products/results?q=umbrella").await;
    assert!(body.contains("No products found"));
    assert!(body.contains("Try adjusting your search or filters"));
}

#[tokio::test]
async fn test_listing_load_more() {
    let products: Vec<_> = (1..=10)
        .map(|id| serde_json::json!({"id": id, "title": format!("Item {id:02}"), "price": id}))
        .collect();
    let ctx = TestContext::with_products(serde_json::Value::Array(products)).await;

    let first = ctx.get_text("/products/results").await;
    assert_eq!(first.matches("product-card\"").count(), INITIAL_VISIBLE);
    assert!(first.contains("Load more"));
    assert!(!first.contains("Show less"));

    let second = ctx.get_text("/products/results?loads=1").await;
    assert_eq!(second.matches("product-card\"").count(), 10);
    assert!(!second.contains("Load more"));
    assert!(second.contains("Show less"));
}

#[tokio::test]
async fn test_listing_api_failure_offers_retry() {
    let ctx = TestContext::with_unreachable_api().await;

    let body = ctx.get_text("/products").await;
    assert!(body.contains("Failed to load products. Please try again."));
    assert!(body.contains("Try Again"));
    assert!(body.contains(r#"data-status="error""#));
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_cart_add_update_remove() {
    let ctx = TestContext::with_products(sample_products()).await;
    ctx.get_text("/products").await;

    ctx.post_form("/cart/add", &[("id", "1")]).await;
    let badge = ctx.post_form("/cart/add", &[("id", "1")]).await;
    assert!(badge.contains(">2<"));

    let cart = ctx.get_text("/cart").await;
    assert!(cart.contains("Red Running Shoe"));
    assert!(cart.contains("$41.00"));

    let items = ctx.post_form("/cart/update", &[("id", "1"), ("delta", "-2")]).await;
    assert!(items.contains("Your cart is empty."));
    assert!(!ctx.get_text("/cart/count").await.contains("cart-count"));
}

#[tokio::test]
async fn test_cart_add_unknown_product() {
    let ctx = TestContext::with_products(sample_products()).await;

    let resp = ctx
        .client
        .post(ctx.url("/cart/add"))
        .form(&[("id", "999")])
        .send()
        .await
        .expect("Request failed");
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_is_per_visitor() {
    let ctx = TestContext::with_products(sample_products()).await;
    ctx.post_form("/cart/add", &[("id", "2")]).await;

    let other = TestContext {
        client: reqwest::Client::new(),
        base_url: ctx.base_url.clone(),
    };
    assert!(other.get_text("/cart").await.contains("Your cart is empty."));
    assert!(ctx.get_text("/cart").await.contains("Blue Hat"));
}

// ============================================================================
// Offer countdown
// ============================================================================

#[tokio::test]
async fn test_countdown_persists_across_requests() {
    let ctx = TestContext::with_products(sample_products()).await;

    let first = ctx.get_text("/offer/countdown").await;
    assert!(
        first.contains(r#"data-unit="hours">47<"#) || first.contains(r#"data-unit="hours">48<"#)
    );
    assert!(!first.contains("This offer has ended."));

    let home = ctx.get_text("/").await;
    assert!(home.contains("Exclusive offer"));
    assert!(home.contains(r#"data-unit="hours">47<"#));
}

//! Integration tests for Shopfront.
//!
//! Each test boots the storefront in-process on an ephemeral port, backed by
//! a fake products API and in-memory session storage, and drives it over
//! HTTP with a cookie-keeping client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopfront-integration-tests
//! ```

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::collections::HashMap;

use axum::{Json, Router, routing::get};
use reqwest::Client;
use serde_json::Value;
use tower_sessions::MemoryStore;

use shopfront_storefront::config::StorefrontConfig;
use shopfront_storefront::state::AppState;
use shopfront_storefront::{app, db};

/// A running storefront plus the client talking to it.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Start a storefront whose catalog comes from a fake API serving `payload`.
    pub async fn with_products(payload: Value) -> Self {
        let api = Router::new().route(
            "/products",
            get(move || {
                let payload = payload.clone();
                async move { Json(payload) }
            }),
        );
        let api_url = format!("http://{}/products", spawn(api).await);
        Self::start(&api_url).await
    }

    /// Start a storefront whose products API refuses connections.
    pub async fn with_unreachable_api() -> Self {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to read address");
        drop(listener);
        Self::start(&format!("http://{addr}/products")).await
    }

    async fn start(api_url: &str) -> Self {
        let vars = HashMap::from([
            ("DATABASE_URL", "sqlite::memory:".to_string()),
            ("PRODUCTS_API_URL", api_url.to_string()),
            ("PRODUCTS_API_TIMEOUT_SECS", "2".to_string()),
        ]);
        let config = StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
            .expect("Failed to build config");

        let pool = db::create_pool(&config.database_url)
            .await
            .expect("Failed to create pool");
        let state = AppState::new(config, pool).expect("Failed to build state");
        let addr = spawn(app(state, MemoryStore::default())).await;

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: format!("http://{addr}"),
        }
    }

    /// Absolute URL for `path` on the storefront.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` and return the body, asserting a success status.
    pub async fn get_text(&self, path: &str) -> String {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed");
        assert!(resp.status().is_success(), "GET {path} returned {}", resp.status());
        resp.text().await.expect("Failed to read body")
    }

    /// POST a form to `path` and return the body, asserting a success status.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> String {
        let resp = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Request failed");
        assert!(resp.status().is_success(), "POST {path} returned {}", resp.status());
        resp.text().await.expect("Failed to read body")
    }
}

/// A catalog with three products across two categories.
#[must_use]
pub fn sample_products() -> Value {
    serde_json::json!([
        {"id": 1, "title": "Red Running Shoe", "price": 20.5, "category": "shoes",
         "description": "Light and fast", "image": "https://example.test/1.jpg",
         "rating": {"rate": 4.5, "count": 12}},
        {"id": 2, "title": "Blue Hat", "price": "9.99", "category": "hats"},
        {"id": 3, "title": "Green Trail Shoe", "price": 35, "category": "shoes"}
    ])
}

async fn spawn(router: Router) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server error");
    });
    addr
}

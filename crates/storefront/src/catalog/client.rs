//! HTTP client for the remote products endpoint.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;

use shopfront_core::{NormalizedCatalog, Product};

use super::CatalogError;
use crate::config::ProductApiConfig;

/// Client for the remote products API.
///
/// Fetches the raw JSON list and normalizes it into [`Product`]s.
#[derive(Clone)]
pub struct ProductApiClient {
    inner: Arc<ProductApiClientInner>,
}

struct ProductApiClientInner {
    client: reqwest::Client,
    url: Url,
    token: Option<SecretString>,
}

impl ProductApiClient {
    /// Create a new products API client.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ProductApiConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(ProductApiClientInner {
                client,
                url: config.url.clone(),
                token: config.token.clone(),
            }),
        })
    }

    /// Fetch and normalize the product list.
    ///
    /// Records that cannot be normalized are skipped and logged. A body that
    /// is valid JSON but not an array yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on network failures, non-success statuses and
    /// bodies that are not JSON.
    #[instrument(skip(self), fields(url = %self.inner.url))]
    pub async fn fetch_products(&self) -> Result<Vec<Product>, CatalogError> {
        let mut request = self
            .inner
            .client
            .get(self.inner.url.clone())
            .header("Accept", "application/json");
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Products API returned non-success status"
            );
            return Err(CatalogError::Status(status.as_u16()));
        }

        let payload: Value = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse products response"
            );
            CatalogError::Parse(e)
        })?;

        let catalog = NormalizedCatalog::from_payload(payload, &mut rand::rng());

        if catalog.not_a_list {
            warn!("Products response is not a JSON array, treating as empty");
        }
        for (index, reason) in &catalog.skipped {
            warn!(index, reason = %reason, "Skipping product record");
        }
        debug!(count = catalog.products.len(), "Fetched products");

        Ok(catalog.products)
    }
}

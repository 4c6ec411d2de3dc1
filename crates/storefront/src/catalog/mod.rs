//! Shared product catalog.
//!
//! # Architecture
//!
//! - One [`CatalogStore`] per process, held in `AppState`
//! - Populated from a prior snapshot or by a single remote fetch
//! - A successful load is kept for the lifetime of the process; a failed
//!   load is retried by the next request that needs the catalog
//! - Fetches run on a detached task, so a request that is cancelled halfway
//!   never leaves the store in `Loading`

mod client;

pub use client::ProductApiClient;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, instrument};

use shopfront_core::CatalogState;

/// Errors that can occur when fetching the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Products API returned status {0}")]
    Status(u16),

    /// The body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Process-wide product catalog with load status.
///
/// Cheaply cloneable; all clones share the same state.
#[derive(Clone)]
pub struct CatalogStore {
    inner: Arc<CatalogStoreInner>,
}

struct CatalogStoreInner {
    client: ProductApiClient,
    state: RwLock<CatalogState>,
    /// Serializes fetches so concurrent requests share one load.
    load_gate: Arc<Mutex<()>>,
}

impl CatalogStore {
    /// Create an empty store that loads through `client` on first use.
    #[must_use]
    pub fn new(client: ProductApiClient) -> Self {
        Self {
            inner: Arc::new(CatalogStoreInner {
                client,
                state: RwLock::new(CatalogState::new()),
                load_gate: Arc::new(Mutex::new(())),
            }),
        }
    }

    /// Current state. Never waits for a fetch.
    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.read().clone()
    }

    /// Return the loaded catalog, fetching it first if needed.
    ///
    /// The returned state is either `Success` or `Error`.
    #[instrument(skip(self))]
    pub async fn ensure_loaded(&self) -> CatalogState {
        if let Some(state) = self.loaded() {
            return state;
        }

        let gate = Arc::clone(&self.inner.load_gate).lock_owned().await;

        // Another request may have finished loading while we waited.
        if let Some(state) = self.loaded() {
            return state;
        }

        let store = self.clone();
        let fetch = tokio::spawn(async move {
            let _gate = gate;
            store.reload().await
        });

        match fetch.await {
            Ok(state) => state,
            Err(e) => {
                error!(error = %e, "Catalog fetch task failed");
                self.snapshot()
            }
        }
    }

    fn loaded(&self) -> Option<CatalogState> {
        let state = self.read();
        state.has_products().then(|| state.clone())
    }

    async fn reload(&self) -> CatalogState {
        let ticket = self.write().begin_load();

        let outcome = self.inner.client.fetch_products().await;

        let mut state = self.write();
        match outcome {
            Ok(products) => {
                info!(count = products.len(), "Catalog loaded");
                state.complete(ticket, products);
            }
            Err(e) => {
                error!(error = %e, "Failed to load catalog");
                state.fail(ticket);
            }
        }
        state.clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

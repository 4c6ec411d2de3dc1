//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::catalog::{CatalogError, CatalogStore, ProductApiClient};
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and the product catalog.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: SqlitePool,
    catalog: CatalogStore,
}

impl AppState {
    /// Create a new application state with an empty catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the products API client cannot be built.
    pub fn new(config: StorefrontConfig, pool: SqlitePool) -> Result<Self, CatalogError> {
        let client = ProductApiClient::new(&config.products)?;
        Ok(Self::with_catalog(config, pool, CatalogStore::new(client)))
    }

    /// Create application state around an existing catalog store.
    #[must_use]
    pub fn with_catalog(config: StorefrontConfig, pool: SqlitePool, catalog: CatalogStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }
}

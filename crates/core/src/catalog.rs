//! Catalog load state.
//!
//! Each fetch attempt takes a [`LoadTicket`] from [`CatalogState::begin_load`].
//! Only the ticket of the most recent attempt can complete it, so a slow
//! response from an older attempt never overwrites newer state.

use std::sync::Arc;

use crate::product::Product;
use crate::types::LoadStatus;

/// Handle for one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// The product list together with the status of the last fetch.
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    items: Arc<[Product]>,
    status: LoadStatus,
    generation: u64,
}

impl CatalogState {
    /// A state that has not fetched anything yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A state seeded from products that were already loaded elsewhere.
    #[must_use]
    pub fn from_snapshot(items: Vec<Product>) -> Self {
        Self {
            items: items.into(),
            status: LoadStatus::Success,
            generation: 0,
        }
    }

    /// Current products. Shared, so cloning is cheap.
    #[must_use]
    pub fn items(&self) -> Arc<[Product]> {
        Arc::clone(&self.items)
    }

    #[must_use]
    pub const fn status(&self) -> LoadStatus {
        self.status
    }

    /// Whether the last fetch succeeded and produced at least one product.
    #[must_use]
    pub fn has_products(&self) -> bool {
        self.status == LoadStatus::Success && !self.items.is_empty()
    }

    /// Start a new attempt, superseding any attempt still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.status = LoadStatus::Loading;
        LoadTicket(self.generation)
    }

    /// Whether `ticket` belongs to the most recent attempt.
    #[must_use]
    pub const fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Record a successful fetch. Items are replaced as a whole.
    ///
    /// Returns `false` and leaves the state untouched for a stale ticket.
    pub fn complete(&mut self, ticket: LoadTicket, items: Vec<Product>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.items = items.into();
        self.status = LoadStatus::Success;
        true
    }

    /// Record a failed fetch. Previously loaded items are kept.
    ///
    /// Returns `false` and leaves the state untouched for a stale ticket.
    pub fn fail(&mut self, ticket: LoadTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.status = LoadStatus::Error;
        true
    }
}

//! Live product listing.
//!
//! A [`ProductListing`] backs one live-search connection. It holds the
//! visitor's filter criteria, debounces search input and, when the catalog
//! has not been loaded yet, owns the load that fills it in. Dropping the
//! listing cancels both.

use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::warn;

use shopfront_core::{CatalogState, FilterCriteria};

use crate::catalog::CatalogStore;
use crate::routes::products::GridView;
use crate::tasks::{Debouncer, SEARCH_DEBOUNCE, ScopedTask};

/// A visitor action on the listing.
///
/// Sent by the browser as JSON, e.g. `{"action":"search","value":"shoe"}`
/// or `{"action":"load_more"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum ListingCommand {
    Search(String),
    Category(String),
    LoadMore,
    LoadLess,
    ClearFilters,
    Retry,
}

/// State of one mounted product listing.
pub struct ProductListing {
    store: CatalogStore,
    catalog: CatalogState,
    criteria: FilterCriteria,
    search: Debouncer<String>,
    load: Option<ScopedTask<CatalogState>>,
}

impl ProductListing {
    /// Mount a listing over `store`.
    ///
    /// Uses the loaded catalog if there is one, otherwise starts loading it.
    /// Debounced search text arrives on the returned receiver and should be
    /// passed to [`ProductListing::apply_search`].
    #[must_use]
    pub fn mount(
        store: CatalogStore,
        criteria: FilterCriteria,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        let catalog = store.snapshot();
        let (search, searches) = Debouncer::new(SEARCH_DEBOUNCE);
        let mut listing = Self {
            store,
            catalog,
            criteria,
            search,
            load: None,
        };
        if !listing.catalog.has_products() {
            listing.start_load();
        }
        (listing, searches)
    }

    fn start_load(&mut self) {
        // Render as loading until the result arrives.
        self.catalog = CatalogState::new();
        let store = self.store.clone();
        self.load = Some(ScopedTask::spawn(
            async move { store.ensure_loaded().await },
        ));
    }

    /// Whether a catalog load is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.load.is_some()
    }

    /// Wait for the in-flight load and take its result.
    ///
    /// Never completes when no load is running. Cancel-safe: dropping the
    /// returned future keeps the load running for the next call.
    pub async fn finish_load(&mut self) {
        let Some(task) = self.load.as_mut() else {
            return std::future::pending().await;
        };
        let result = task.await;
        self.load = None;
        match result {
            Ok(catalog) => self.catalog = catalog,
            Err(e) => warn!(error = %e, "Catalog load for listing did not finish"),
        }
    }

    /// Apply a visitor action. Returns whether the grid should be re-rendered
    /// right away; search input is applied later, after the debounce.
    pub fn apply(&mut self, command: ListingCommand) -> bool {
        match command {
            ListingCommand::Search(text) => {
                self.input_search(text);
                return false;
            }
            ListingCommand::Category(category) => self.select_category(category),
            ListingCommand::LoadMore => self.load_more(),
            ListingCommand::LoadLess => self.load_less(),
            ListingCommand::ClearFilters => self.clear_filters(),
            ListingCommand::Retry => self.retry(),
        }
        true
    }

    /// Queue search text; it takes effect once typing pauses.
    pub fn input_search(&mut self, text: String) {
        self.search.push(text);
    }

    /// Set the search text now.
    pub fn apply_search(&mut self, text: String) {
        self.criteria.search_text = text;
    }

    pub fn select_category(&mut self, category: String) {
        self.criteria.selected_category = category;
    }

    pub const fn load_more(&mut self) {
        self.criteria.visible_count.load_more();
    }

    pub const fn load_less(&mut self) {
        self.criteria.visible_count.load_less();
    }

    /// Reset search and category, dropping any search still being debounced.
    pub fn clear_filters(&mut self) {
        self.search.cancel();
        self.criteria.clear_filters();
    }

    /// Try loading again after a failed load.
    pub fn retry(&mut self) {
        if !self.catalog.has_products() && !self.is_loading() {
            self.start_load();
        }
    }

    #[must_use]
    pub const fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    /// The grid for the current catalog and criteria.
    #[must_use]
    pub fn render(&self) -> GridView {
        GridView::build(&self.catalog, &self.criteria)
    }
}

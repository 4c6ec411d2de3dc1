//! Search, category filter and "load more" pagination over the catalog.
//!
//! The pipeline is a pure function of the product list and a
//! [`FilterCriteria`]; running it twice with the same inputs gives the same
//! page in the same order.

use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Number of products visible before any "load more".
pub const INITIAL_VISIBLE: usize = 6;

/// Number of products each "load more" adds.
pub const VISIBLE_STEP: usize = 6;

/// How many matching products are shown.
///
/// Only grows in steps of [`VISIBLE_STEP`] or resets to [`INITIAL_VISIBLE`];
/// there is no way to set an arbitrary value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleCount {
    loads: u32,
}

impl VisibleCount {
    /// The initial window.
    #[must_use]
    pub const fn initial() -> Self {
        Self { loads: 0 }
    }

    /// The window after `loads` presses of "load more".
    #[must_use]
    pub const fn after_loads(loads: u32) -> Self {
        Self { loads }
    }

    /// Number of "load more" presses this window represents.
    #[must_use]
    pub const fn loads(self) -> u32 {
        self.loads
    }

    /// The number of products shown.
    #[must_use]
    pub fn get(self) -> usize {
        let loads = usize::try_from(self.loads).unwrap_or(usize::MAX);
        INITIAL_VISIBLE.saturating_add(loads.saturating_mul(VISIBLE_STEP))
    }

    /// Show [`VISIBLE_STEP`] more products.
    pub const fn load_more(&mut self) {
        self.loads = self.loads.saturating_add(1);
    }

    /// Go back to the initial window.
    pub const fn load_less(&mut self) {
        self.loads = 0;
    }
}

impl Default for VisibleCount {
    fn default() -> Self {
        Self::initial()
    }
}

/// Transient listing inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Search text as typed; surrounding whitespace is ignored.
    pub search_text: String,
    /// Selected category; empty means all categories.
    pub selected_category: String,
    pub visible_count: VisibleCount,
}

impl FilterCriteria {
    /// Reset search text and category. The visible window is kept.
    pub fn clear_filters(&mut self) {
        self.search_text.clear();
        self.selected_category.clear();
    }

    /// Whether `product` passes the search and category filters.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let needle = self.search_text.trim().to_lowercase();
        matches_search(product, &needle) && self.matches_category(product)
    }

    fn matches_category(&self, product: &Product) -> bool {
        self.selected_category.is_empty() || product.category == self.selected_category
    }
}

fn matches_search(product: &Product, needle: &str) -> bool {
    needle.is_empty()
        || product.title.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
}

/// A page of matching products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredPage<'a> {
    /// Visible products in catalog order.
    pub items: Vec<&'a Product>,
    /// Number of products that passed the filters.
    pub total_matches: usize,
    pub visible_count: VisibleCount,
}

impl FilteredPage<'_> {
    /// More matches exist beyond the visible window.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.visible_count.get() < self.total_matches
    }

    /// The window is larger than the initial one.
    #[must_use]
    pub const fn can_show_less(&self) -> bool {
        self.visible_count.loads() > 0
    }
}

/// Outcome of running the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterResult<'a> {
    /// At least one product matched.
    Matches(FilteredPage<'a>),
    /// Nothing matched the current search and category.
    NoResults,
}

impl FilterResult<'_> {
    #[must_use]
    pub const fn is_no_results(&self) -> bool {
        matches!(self, Self::NoResults)
    }

    /// Visible products, empty for [`FilterResult::NoResults`].
    #[must_use]
    pub fn items(&self) -> &[&Product] {
        match self {
            Self::Matches(page) => &page.items,
            Self::NoResults => &[],
        }
    }
}

/// Filter `products` by `criteria` and cut the result to the visible window.
#[must_use]
pub fn filter_catalog<'a>(products: &'a [Product], criteria: &FilterCriteria) -> FilterResult<'a> {
    let matching: Vec<&Product> = products
        .iter()
        .filter(|product| criteria.matches(product))
        .collect();

    if matching.is_empty() {
        return FilterResult::NoResults;
    }

    let total_matches = matching.len();
    let items = matching
        .into_iter()
        .take(criteria.visible_count.get())
        .collect();

    FilterResult::Matches(FilteredPage {
        items,
        total_matches,
        visible_count: criteria.visible_count,
    })
}

/// Distinct non-empty categories present in `products`.
///
/// Returned in first-seen order, but callers should not rely on the order.
#[must_use]
pub fn distinct_categories(products: &[Product]) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for product in products {
        if !product.category.is_empty() && !categories.contains(&product.category) {
            categories.push(product.category.clone());
        }
    }
    categories
}

//! Product listing route handlers.
//!
//! The listing works without JavaScript through plain query parameters
//! (`q`, `category`, `loads`). With JavaScript, `/products/live` keeps a
//! WebSocket open and pushes a fresh grid after every change.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use shopfront_core::filter::{distinct_categories, filter_catalog};
use shopfront_core::text::truncate_words;
use shopfront_core::{
    CatalogState, FilterCriteria, FilterResult, LoadStatus, Product, VisibleCount,
};

use crate::catalog::CatalogStore;
use crate::filters;
use crate::listing::{ListingCommand, ProductListing};
use crate::state::AppState;

const LISTING_PATH: &str = "/products";
const RESULTS_PATH: &str = "/products/results";

/// Words kept from a product title on cards.
const CARD_TITLE_WORDS: usize = 3;

/// Words kept from a product description on cards.
const CARD_DESCRIPTION_WORDS: usize = 16;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductCard {
    pub id: i64,
    pub title: String,
    pub short_title: String,
    pub short_description: String,
    pub price: String,
    pub image: String,
    pub category: String,
    pub seller: String,
    pub rating: Option<String>,
    pub baths: u32,
    pub beds: u32,
    pub area: u32,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            title: product.title.clone(),
            short_title: truncate_words(&product.title, CARD_TITLE_WORDS),
            short_description: truncate_words(&product.description, CARD_DESCRIPTION_WORDS),
            price: product.price.to_string(),
            image: product.image.clone(),
            category: product.category.clone(),
            seller: product.seller.clone(),
            rating: product
                .rating
                .map(|rating| format!("{} ({})", rating.rate, rating.count)),
            baths: product.details.baths.value(),
            beds: product.details.beds.value(),
            area: product.details.area.value(),
        }
    }
}

/// Category dropdown entry.
#[derive(Clone)]
pub struct CategoryOption {
    pub value: String,
    pub selected: bool,
}

/// Listing query parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListingQuery {
    pub q: String,
    pub category: String,
    pub loads: u32,
}

impl ListingQuery {
    #[must_use]
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search_text: self.q.clone(),
            selected_category: self.category.clone(),
            visible_count: VisibleCount::after_loads(self.loads),
        }
    }

    #[must_use]
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        Self {
            q: criteria.search_text.clone(),
            category: criteria.selected_category.clone(),
            loads: criteria.visible_count.loads(),
        }
    }

    /// URL under `path` for these filters with `loads` "load more" steps.
    fn href(&self, path: &str, loads: u32) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        let q = self.q.trim();
        if !q.is_empty() {
            query.append_pair("q", q);
        }
        if !self.category.is_empty() {
            query.append_pair("category", &self.category);
        }
        if loads > 0 {
            query.append_pair("loads", &loads.to_string());
        }
        let query = query.finish();
        if query.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{query}")
        }
    }
}

/// Render-ready product grid.
#[derive(Clone)]
pub struct GridView {
    pub status: LoadStatus,
    pub cards: Vec<ProductCard>,
    pub total_matches: usize,
    pub no_results: bool,
    pub has_more: bool,
    pub can_show_less: bool,
    pub more_href: String,
    pub less_href: String,
    pub retry_href: String,
    pub retry_fragment_href: String,
}

impl GridView {
    /// Run the filter pipeline over `catalog`.
    ///
    /// Loading and error states carry no cards.
    #[must_use]
    pub fn build(catalog: &CatalogState, criteria: &FilterCriteria) -> Self {
        let query = ListingQuery::from_criteria(criteria);
        let mut view = Self {
            status: catalog.status(),
            cards: Vec::new(),
            total_matches: 0,
            no_results: false,
            has_more: false,
            can_show_less: false,
            more_href: query.href(LISTING_PATH, query.loads.saturating_add(1)),
            less_href: query.href(LISTING_PATH, 0),
            retry_href: query.href(LISTING_PATH, query.loads),
            retry_fragment_href: query.href(RESULTS_PATH, query.loads),
        };

        if catalog.status() != LoadStatus::Success {
            return view;
        }

        let items = catalog.items();
        match filter_catalog(&items, criteria) {
            FilterResult::Matches(page) => {
                view.cards = page.items.iter().map(|p| ProductCard::from(*p)).collect();
                view.total_matches = page.total_matches;
                view.has_more = page.has_more();
                view.can_show_less = page.can_show_less();
            }
            FilterResult::NoResults => view.no_results = true,
        }
        view
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == LoadStatus::Error
    }
}

fn category_options(catalog: &CatalogState, selected: &str) -> Vec<CategoryOption> {
    distinct_categories(&catalog.items())
        .into_iter()
        .map(|value| CategoryOption {
            selected: value == selected,
            value,
        })
        .collect()
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub grid: GridView,
    pub categories: Vec<CategoryOption>,
    pub search: String,
    pub category: String,
    pub loads: u32,
}

/// Product grid fragment template (for HTMX and live search).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub grid: GridView,
}

/// Display product listing page.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> impl IntoResponse {
    let catalog = state.catalog().ensure_loaded().await;
    let criteria = query.criteria();

    ProductsIndexTemplate {
        grid: GridView::build(&catalog, &criteria),
        categories: category_options(&catalog, &query.category),
        search: query.q,
        category: query.category,
        loads: query.loads,
    }
}

/// Display the product grid fragment (for HTMX).
#[instrument(skip(state))]
pub async fn results(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> impl IntoResponse {
    let catalog = state.catalog().ensure_loaded().await;
    ProductGridTemplate {
        grid: GridView::build(&catalog, &query.criteria()),
    }
}

/// Upgrade to a live-search WebSocket.
pub async fn live(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let store = state.catalog().clone();
    ws.on_upgrade(move |socket| live_search(socket, store, query.criteria()))
}

/// Drive one live-search connection until the browser goes away.
#[instrument(skip_all)]
async fn live_search(mut socket: WebSocket, store: CatalogStore, criteria: FilterCriteria) {
    let (mut listing, mut searches) = ProductListing::mount(store, criteria);

    if send_grid(&mut socket, &listing).await.is_err() {
        return;
    }

    loop {
        let changed = tokio::select! {
            message = socket.recv() => match message {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ListingCommand>(text.as_str()) {
                        Ok(command) => listing.apply(command),
                        Err(e) => {
                            debug!(error = %e, "Ignoring malformed listing command");
                            false
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => false,
                Some(Err(e)) => {
                    debug!(error = %e, "Live search connection failed");
                    break;
                }
            },
            Some(text) = searches.recv() => {
                listing.apply_search(text);
                true
            }
            () = listing.finish_load(), if listing.is_loading() => true,
        };

        if changed && send_grid(&mut socket, &listing).await.is_err() {
            break;
        }
    }

    debug!("Live search connection closed");
}

async fn send_grid(socket: &mut WebSocket, listing: &ProductListing) -> Result<(), axum::Error> {
    let html = match (ProductGridTemplate {
        grid: listing.render(),
    })
    .render()
    {
        Ok(html) => html,
        Err(e) => {
            warn!(error = %e, "Failed to render product grid");
            return Ok(());
        }
    };
    socket.send(Message::Text(html.into())).await
}

//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::LoadStatus;

use crate::error::Result;
use crate::filters;
use crate::routes::offer::{CountdownView, current_countdown};
use crate::routes::products::ProductCard;
use crate::state::AppState;

/// Number of featured products on the home page.
const FEATURED_PRODUCTS: usize = 6;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Exclusive offer countdown.
    pub countdown: CountdownView,
    /// First products of the catalog.
    pub featured: Vec<ProductCard>,
    /// The catalog could not be loaded.
    pub catalog_failed: bool,
}

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let countdown = current_countdown(&state, &session).await?;
    let catalog = state.catalog().ensure_loaded().await;

    let featured = catalog
        .items()
        .iter()
        .take(FEATURED_PRODUCTS)
        .map(ProductCard::from)
        .collect();

    Ok(HomeTemplate {
        countdown,
        featured,
        catalog_failed: catalog.status() == LoadStatus::Error,
    })
}

//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! The cart itself lives in the visitor's session; every mutation goes
//! through [`Cart::apply`] and is written back before responding.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::{Cart, CartAction, CartChange, CartLineItem, CartProduct, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::models::session::{load_cart, save_cart};
use crate::state::AppState;

/// HTMX event fired after any cart change.
const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartLineItem> for CartItemView {
    fn from(line: &CartLineItem) -> Self {
        Self {
            id: line.id.as_i64(),
            title: line.title.clone(),
            image: line.image.clone(),
            quantity: line.quantity,
            price: line.price.to_string(),
            line_price: line.line_total().to_string(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: cart.subtotal().to_string(),
            item_count: cart.total_quantity(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: ProductId,
}

/// Update quantity form data.
///
/// `delta` is added to the current quantity; a result of zero or less
/// removes the line.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: ProductId,
    pub delta: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Apply `action` to the session cart and store the result.
async fn mutate(session: &Session, action: CartAction) -> Result<(Cart, CartChange)> {
    let mut cart = load_cart(session).await?;
    let change = cart.apply(action);
    if change != CartChange::Unchanged {
        save_cart(session, &cart).await?;
    }
    Ok((cart, change))
}

/// Cart items fragment with the cart-updated trigger.
fn items_fragment(cart: &Cart) -> Response {
    (
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartItemsTemplate {
            cart: CartView::from(cart),
        },
    )
        .into_response()
}

/// Display cart page.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;
    Ok(CartShowTemplate {
        cart: CartView::from(&cart),
    })
}

/// Add a catalog product to the cart (HTMX).
///
/// Returns the updated cart count badge and an HTMX trigger so other
/// cart fragments refresh.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let catalog = state.catalog().ensure_loaded().await;
    let items = catalog.items();
    let product = items
        .iter()
        .find(|p| p.id == form.id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.id)))?;

    let (cart, change) = mutate(&session, CartAction::Add(CartProduct::from(product))).await?;
    tracing::info!(product_id = %form.id, ?change, "Added to cart");
    let product_id = form.id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));

    Ok((
        AppendHeaders([CART_UPDATED_TRIGGER]),
        CartCountTemplate {
            count: cart.total_quantity(),
        },
    )
        .into_response())
}

/// Change a line's quantity by a signed amount (HTMX).
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Result<Response> {
    let (cart, change) = mutate(
        &session,
        CartAction::UpdateQuantity {
            id: form.id,
            delta: form.delta,
        },
    )
    .await?;
    tracing::debug!(product_id = %form.id, ?change, "Updated cart quantity");

    Ok(items_fragment(&cart))
}

/// Remove a line from the cart (HTMX).
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Response> {
    let (cart, change) = mutate(&session, CartAction::Remove { id: form.id }).await?;
    tracing::debug!(product_id = %form.id, ?change, "Removed from cart");

    Ok(items_fragment(&cart))
}

/// Empty the cart (HTMX).
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Response> {
    let (cart, _) = mutate(&session, CartAction::Clear).await?;
    Ok(items_fragment(&cart))
}

/// Get cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<impl IntoResponse> {
    let cart = load_cart(&session).await?;
    Ok(CartCountTemplate {
        count: cart.total_quantity(),
    })
}

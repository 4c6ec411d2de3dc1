//! Per-visitor state stored in the session.

use chrono::{DateTime, Utc};
use tower_sessions::Session;

use shopfront_core::{Cart, Countdown};

use crate::error::Result;

/// Session keys.
pub mod keys {
    /// Key for the visitor's cart (JSON list of line items).
    pub const CART: &str = "cart";

    /// Key for the exclusive offer deadline (ISO-8601 string).
    pub const OFFER_DEADLINE: &str = "offer_deadline";
}

/// Load the visitor's cart, empty if none was stored.
///
/// Stored carts are repaired on load: duplicate lines are merged and
/// non-positive quantities dropped.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session.get::<Cart>(keys::CART).await?.unwrap_or_default())
}

/// Store the visitor's cart.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(keys::CART, cart).await?;
    Ok(())
}

/// Resume the visitor's offer countdown or start a new one.
///
/// A newly chosen deadline is written back to the session so later requests
/// see the same deadline.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn offer_countdown(
    session: &Session,
    now: DateTime<Utc>,
    window: chrono::Duration,
) -> Result<Countdown> {
    let saved = session.get::<String>(keys::OFFER_DEADLINE).await?;
    let start = Countdown::resume_or_start(saved.as_deref(), now, window);

    if let Some(deadline) = start.persist {
        tracing::debug!(%deadline, "Starting offer countdown");
        session.insert(keys::OFFER_DEADLINE, deadline).await?;
    }

    Ok(start.countdown)
}

//! Exclusive offer countdown.
//!
//! The deadline is chosen on a visitor's first view and stored in their
//! session, so reloading the page or reconnecting the stream continues the
//! same countdown.

use std::convert::Infallible;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{
        IntoResponse, Sse,
        sse::{Event, KeepAlive},
    },
};
use chrono::Utc;
use futures::{Stream, StreamExt};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use shopfront_core::TimeLeft;

use crate::error::Result;
use crate::models::session::offer_countdown;
use crate::state::AppState;
use crate::tasks::countdown_ticks;

/// Countdown display data for templates.
#[derive(Debug, Clone, Serialize)]
pub struct CountdownView {
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
    pub expired: bool,
}

impl From<TimeLeft> for CountdownView {
    fn from(left: TimeLeft) -> Self {
        Self {
            hours: left.hours_padded(),
            minutes: left.minutes_padded(),
            seconds: left.seconds_padded(),
            expired: left.is_zero(),
        }
    }
}

/// Countdown fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/countdown.html")]
pub struct CountdownTemplate {
    pub countdown: CountdownView,
}

/// Current countdown for this visitor, starting one if needed.
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails.
pub async fn current_countdown(state: &AppState, session: &Session) -> Result<CountdownView> {
    let countdown = offer_countdown(session, Utc::now(), state.config().offer_window).await?;
    Ok(CountdownView::from(countdown.remaining(Utc::now())))
}

/// Display the countdown fragment.
#[instrument(skip(state, session))]
pub async fn countdown(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse> {
    Ok(CountdownTemplate {
        countdown: current_countdown(&state, &session).await?,
    })
}

/// Stream the countdown as server-sent `tick` events, one per second.
///
/// Each event carries the padded fields as JSON. Once the offer has expired
/// the stream keeps sending zeros.
#[instrument(skip(state, session))]
pub async fn stream(
    State(state): State<AppState>,
    session: Session,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let countdown = offer_countdown(&session, Utc::now(), state.config().offer_window).await?;

    let events = countdown_ticks(countdown).map(|left| {
        let json = serde_json::to_string(&CountdownView::from(left)).unwrap_or_else(|_| {
            r#"{"hours":"00","minutes":"00","seconds":"00","expired":true}"#.to_string()
        });
        Ok(Event::default().event("tick").data(json))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

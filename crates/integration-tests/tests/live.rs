//! Tests for the streaming routes: live search over WebSocket and the offer
//! countdown over server-sent events.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use shopfront_integration_tests::{TestContext, sample_products};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Open `/products/live` once the catalog is loaded and read the first grid.
async fn open_live(ctx: &TestContext) -> (Socket, String) {
    ctx.get_text("/products").await;

    let url = format!("{}/products/live", ctx.base_url.replacen("http", "ws", 1));
    let (mut socket, _) = connect_async(url).await.expect("Failed to connect");
    let first = next_grid(&mut socket, Duration::from_secs(2))
        .await
        .expect("No initial grid");
    (socket, first)
}

/// Next text frame, or `None` if nothing arrives within `wait`.
async fn next_grid(socket: &mut Socket, wait: Duration) -> Option<String> {
    loop {
        let message = tokio::time::timeout(wait, socket.next()).await.ok()??;
        match message.expect("Socket error") {
            Message::Text(html) => return Some(html),
            Message::Close(_) => return None,
            _ => {}
        }
    }
}

async fn send(socket: &mut Socket, command: &str) {
    socket
        .send(Message::text(command))
        .await
        .expect("Failed to send command");
}

// ============================================================================
// Live search
// ============================================================================

#[tokio::test]
async fn test_live_search_is_debounced() {
    let ctx = TestContext::with_products(sample_products()).await;
    let (mut socket, first) = open_live(&ctx).await;
    assert!(first.contains("Red Running Shoe"));
    assert!(first.contains("Blue Hat"));

    for text in ["b", "bl", "blue"] {
        send(&mut socket, &format!(r#"{{"action":"search","value":"{text}"}}"#)).await;
    }

    let grid = next_grid(&mut socket, Duration::from_secs(2))
        .await
        .expect("No grid after search");
    assert!(grid.contains("Blue Hat"));
    assert!(!grid.contains("Red Running Shoe"));

    // The three keystrokes produce a single render.
    assert!(next_grid(&mut socket, Duration::from_millis(600)).await.is_none());
}

#[tokio::test]
async fn test_live_category_and_clear_filters() {
    let ctx = TestContext::with_products(sample_products()).await;
    let (mut socket, _) = open_live(&ctx).await;

    send(&mut socket, r#"{"action":"category","value":"toys"}"#).await;
    let grid = next_grid(&mut socket, Duration::from_secs(1))
        .await
        .expect("No grid after category");
    assert!(grid.contains("No products found"));

    send(&mut socket, r#"{"action":"clear_filters"}"#).await;
    let grid = next_grid(&mut socket, Duration::from_secs(1))
        .await
        .expect("No grid after clearing filters");
    assert!(grid.contains("Red Running Shoe"));
    assert!(grid.contains("Blue Hat"));
}

#[tokio::test]
async fn test_live_ignores_malformed_commands() {
    let ctx = TestContext::with_products(sample_products()).await;
    let (mut socket, _) = open_live(&ctx).await;

    send(&mut socket, r#"{"action":"dance"}"#).await;
    assert!(next_grid(&mut socket, Duration::from_millis(400)).await.is_none());

    send(&mut socket, r#"{"action":"category","value":"hats"}"#).await;
    let grid = next_grid(&mut socket, Duration::from_secs(1))
        .await
        .expect("Connection closed after malformed command");
    assert!(grid.contains("Blue Hat"));
}

// ============================================================================
// Countdown stream
// ============================================================================

/// Read server-sent events until one `tick` arrives and return its data.
async fn first_tick(ctx: &TestContext) -> Value {
    let resp = ctx
        .client
        .get(ctx.url("/offer/countdown/stream"))
        .send()
        .await
        .expect("Request failed");
    assert!(resp.status().is_success());
    let content_type = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/event-stream"));

    let mut body = resp.bytes_stream();
    let mut buffer = String::new();
    let read = async {
        while let Some(chunk) = body.next().await {
            buffer.push_str(&String::from_utf8_lossy(&chunk.expect("Stream error")));
            // An event is complete once a blank line follows it.
            while let Some(end) = buffer.find("\n\n") {
                let event: String = buffer.drain(..end + 2).collect();
                if let Some(data) = tick_data(&event) {
                    let tick: Value = serde_json::from_str(data).expect("Tick data is not JSON");
                    return tick;
                }
            }
        }
        panic!("Stream ended before a tick");
    };
    tokio::time::timeout(Duration::from_secs(3), read)
        .await
        .expect("No tick within 3s")
}

/// The data line of a `tick` event, `None` for other events and comments.
fn tick_data(event: &str) -> Option<&str> {
    let field = |name: &str| {
        event
            .lines()
            .find_map(|line| line.strip_prefix(name))
            .map(|value| value.strip_prefix(' ').unwrap_or(value))
    };
    (field("event:")? == "tick").then(|| field("data:")).flatten()
}

#[tokio::test]
async fn test_countdown_stream_sends_padded_ticks() {
    let ctx = TestContext::with_products(sample_products()).await;

    let tick = first_tick(&ctx).await;
    for unit in ["hours", "minutes", "seconds"] {
        let value = tick[unit].as_str().expect("Unit is not a string");
        assert_eq!(value.len(), 2, "{unit} = {value:?}");
        assert!(value.chars().all(|c| c.is_ascii_digit()));
    }
    assert!(tick["hours"] == "47" || tick["hours"] == "48");
    assert_eq!(tick["expired"], false);
}

#[tokio::test]
async fn test_countdown_stream_resumes_session_deadline() {
    let ctx = TestContext::with_products(sample_products()).await;

    let fragment = ctx.get_text("/offer/countdown").await;
    let tick = first_tick(&ctx).await;
    let hours = tick["hours"].as_str().expect("Unit is not a string");
    assert!(fragment.contains(&format!(r#"data-unit="hours">{hours}<"#)));
}

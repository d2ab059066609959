// Shared mock server for integration tests: a `/spectate` WebSocket that plays
// a short script and then closes, plus a static `/rooms` listing.

use axum::{
    Json, Router,
    extract::{
        Query,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use std::{
    collections::HashMap,
    // `Arc` shares data between threads; `OnceLock` writes a value only once.
    sync::{Arc, Mutex, OnceLock},
    // Used by readiness polling and the pause before each close frame.
    time::Duration,
};

pub const MAIN_ROOM_TOKEN: &str = "tok-main";

// Global base URL used by all tests after the server publishes its bound address.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// One-time guard that ensures the server bootstrap path runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();
// Accepted spectate connections keyed by room token ("" when absent).
static CONNECTIONS: OnceLock<Mutex<HashMap<String, usize>>> = OnceLock::new();

// Number of spectate connections accepted so far for one room token.
pub fn connections(room_token: &str) -> usize {
    CONNECTIONS
        .get_or_init(Default::default)
        .lock()
        .expect("connections lock")
        .get(room_token)
        .copied()
        .unwrap_or(0)
}

fn record_connection(room_token: &str) {
    *CONNECTIONS
        .get_or_init(Default::default)
        .lock()
        .expect("connections lock")
        .entry(room_token.to_string())
        .or_default() += 1;
}

// Ensure the mock server is running and return the shared base URL.
pub fn ensure_server() -> &'static str {
    // Every test in the binary shares one server, started by whichever test gets here first.
    SERVER_READY.get_or_init(|| {
        // Slot the server thread fills once the OS has picked a port.
        let published_url = Arc::new(OnceLock::<String>::new());
        // Second handle to the slot, moved into the server thread.
        let published_url_thread = Arc::clone(&published_url);
        // Spawn an OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            // The server gets a runtime of its own, independent of any test runtime.
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Bind to an ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                // Read back the port the OS assigned.
                let addr = listener.local_addr().expect("get local addr");
                // Publish the base URL for the waiting test thread.
                let _ = published_url_thread.set(format!("http://{}", addr));
                // Serve until the test process exits.
                axum::serve(listener, router()).await.expect("server failed");
            });
        });
        // Block until the URL is published and the port accepts connections.
        wait_for_server_url_and_readiness(published_url);
    });

    // Every caller gets the same URL.
    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

// Routes mirror the two server endpoints the spectator talks to.
fn router() -> Router {
    Router::new()
        .route("/spectate", get(spectate_handler))
        .route("/rooms", get(rooms_handler))
}

// Static listing; the first entry is the room a token-less spectator picks.
async fn rooms_handler() -> impl IntoResponse {
    Json(serde_json::json!([
        {
            "id": "1",
            "name": "Main arena",
            "max_players": 8,
            "time_limit_seconds": 300,
            "token": MAIN_ROOM_TOKEN
        },
        {
            "id": "2",
            "name": "Practice",
            "max_players": 2,
            "time_limit_seconds": 60,
            "token": "tok-practice"
        }
    ]))
}

async fn spectate_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    // Connections without a token are counted under "".
    let room_token = params.get("room_token").cloned().unwrap_or_default();
    ws.on_upgrade(move |socket| play_script(socket, room_token))
}

// Each connection: team names, noise the client must drop, one state frame,
// then a server-initiated close.
async fn play_script(mut socket: WebSocket, room_token: String) {
    record_connection(&room_token);
    // The connection ordinal doubles as entity 1's score, so reconnects are visible.
    let connection = connections(&room_token);

    let script = vec![
        Message::Text(
            serde_json::json!({"e": "teamnames", "data": {"1": "Alpha", "2": "Beta"}})
                .to_string()
                .into(),
        ),
        Message::Text("{not json".into()),
        Message::Binary(vec![0u8, 1, 2].into()),
        Message::Text(r#"{"e":"id","data":1}"#.into()),
        Message::Text(
            serde_json::json!({
                "e": "state",
                "data": {
                    "bounds": [1000, 500],
                    "players": [
                        {"id": 1, "x": 100.0, "y": 100.0, "angle": 0.0},
                        {"id": 2, "x": 300.0, "y": 200.0, "angle": 1.0}
                    ],
                    "bullets": [{"id": 9, "player_id": 1, "x": 120.0, "y": 100.0, "angle": 0.0}],
                    "scoreboard": {"1": connection, "2": 1}
                }
            })
            .to_string()
            .into(),
        ),
    ];

    // A failed send means the client already hung up.
    for message in script {
        if socket.send(message).await.is_err() {
            return;
        }
    }

    // Give the client a moment to read before the close frame.
    tokio::time::sleep(Duration::from_millis(20)).await;
    let _ = socket.send(Message::Close(None)).await;
}

// Wait for URL publication and then wait for the server socket to accept TCP connections.
fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    // Poll until the server thread publishes the base URL.
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        // Sleep between checks instead of spinning.
        std::thread::sleep(Duration::from_millis(10));
    };

    // Store the URL globally so every test targets the same server.
    let _ = SERVER_URL.set(base_url.clone());

    // Strip the scheme so we can use host:port for raw TCP readiness checks.
    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    // Retry for up to two seconds to cover the gap between bind and accept.
    for _ in 0..100 {
        // A successful connect means the listener is accepting.
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    // Startup never reached an accepting state.
    panic!("server did not become ready in time");
}

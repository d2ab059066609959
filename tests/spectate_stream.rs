mod support;

use spectator::SpectatorConfig;
use spectator::domain::{ConnectionStatus, EntityId};
use spectator::frameworks::runtime::resolve_room_token;
use spectator::interface_adapters::clients::{RoomsClient, RoomsClientError};
use spectator::interface_adapters::net::{ReconnectingTransport, WsConnector, spectate_endpoint};
use spectator::interface_adapters::surface::{CommandRecorder, DrawCommand};
use spectator::use_cases::{
    ScoreboardSink, ScoreboardView, SpectatorEvent, SpectatorSession, run_session,
};
use std::{sync::Arc, time::Duration};
use tokio::sync::{mpsc, watch};

const BACKOFF: Duration = Duration::from_millis(50);
const WAIT: Duration = Duration::from_secs(5);

fn config(server_url: &str, room_token: Option<&str>) -> SpectatorConfig {
    SpectatorConfig {
        server_url: server_url.to_string(),
        room_token: room_token.map(str::to_string),
        reconnect_backoff: BACKOFF,
        surface_width: 800,
        surface_height: 800,
        headless: true,
        rooms_timeout: Duration::from_millis(500),
    }
}

fn spawn_transport(
    room_token: &str,
) -> (
    spectator::interface_adapters::net::TransportHandle,
    mpsc::Receiver<SpectatorEvent>,
    watch::Receiver<ConnectionStatus>,
) {
    let base_url = support::ensure_server();
    let endpoint = spectate_endpoint(base_url, Some(room_token)).expect("endpoint");
    let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);
    let (event_tx, event_rx) = mpsc::channel(64);
    let handle = ReconnectingTransport::new(Arc::new(WsConnector), endpoint, BACKOFF, status_tx)
        .spawn(event_tx);
    (handle, event_rx, status_rx)
}

#[tokio::test]
async fn when_server_closes_the_socket_then_transport_reconnects_and_keeps_streaming() {
    let (handle, mut events, status) = spawn_transport("reconnect-case");

    let mut states = Vec::new();
    let mut team_names = 0;
    tokio::time::timeout(WAIT, async {
        while states.len() < 2 {
            match events.recv().await.expect("transport should stay alive") {
                SpectatorEvent::TeamNames(_) => team_names += 1,
                SpectatorEvent::State(snapshot) => states.push(snapshot),
            }
        }
    })
    .await
    .expect("two connections should deliver two states");

    // Noise frames never reach the consumer.
    assert_eq!(team_names, 2);
    assert!(support::connections("reconnect-case") >= 2);
    assert_eq!(states[0].scoreboard.get(&EntityId::from("1")), Some(1));
    assert_eq!(states[1].scoreboard.get(&EntityId::from("1")), Some(2));
    assert_eq!(states[1].players.len(), 2);

    handle.shutdown().await;
    assert_eq!(*status.borrow(), ConnectionStatus::Disconnected);
}

#[derive(Default)]
struct RecordingSink {
    views: Vec<ScoreboardView>,
}

impl ScoreboardSink for RecordingSink {
    fn replace(&mut self, view: &ScoreboardView) {
        self.views.push(view.clone());
    }
}

#[tokio::test]
async fn when_frames_stream_in_then_session_draws_named_ships_and_ranks_scores() {
    let (handle, mut events, _status) = spawn_transport("session-case");
    let (forward_tx, forward_rx) = mpsc::channel(64);
    let session = SpectatorSession::new(CommandRecorder::new(800.0, 800.0), RecordingSink::default());
    let session_task = tokio::spawn(run_session(forward_rx, session));

    // Forward exactly two connections' worth of events, then hang up.
    tokio::time::timeout(WAIT, async {
        let mut states = 0;
        while states < 2 {
            let event = events.recv().await.expect("transport should stay alive");
            if matches!(event, SpectatorEvent::State(_)) {
                states += 1;
            }
            forward_tx.send(event).await.expect("session alive");
        }
    })
    .await
    .expect("two states should arrive");
    drop(forward_tx);
    handle.shutdown().await;

    let session = session_task.await.expect("session task");
    assert_eq!(session.frames_rendered(), 2);

    let labels: Vec<_> = session
        .canvas()
        .commands()
        .iter()
        .filter_map(|cmd| match cmd {
            DrawCommand::FillText { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec!["Alpha", "Beta", "Alpha", "Beta"]);

    // Score for entity 1 moves from 1 to 2 between connections.
    let views = &session.sink().views;
    assert_eq!(views.len(), 2);
    assert_eq!(views[1].rows[0].label, "Alpha");
    assert_eq!(views[1].rows[0].score, 2);
}

#[tokio::test]
async fn when_rooms_are_listed_then_entries_come_back_in_server_order() {
    let base_url = support::ensure_server();
    let client = RoomsClient::new(base_url, Duration::from_secs(1)).expect("client");

    let rooms = client.list_rooms().await.expect("listing");
    assert_eq!(rooms.len(), 2);
    assert_eq!(rooms[0].token, support::MAIN_ROOM_TOKEN);
    assert_eq!(rooms[1].name, "Practice");

    let first = client.first_room().await.expect("listing");
    assert_eq!(first.map(|room| room.id), Some("1".to_string()));
}

#[tokio::test]
async fn when_rooms_path_is_missing_then_upstream_status_is_reported() {
    let base_url = support::ensure_server();
    let client =
        RoomsClient::new(format!("{base_url}/nowhere"), Duration::from_secs(1)).expect("client");

    let result = client.list_rooms().await;
    assert!(matches!(
        result,
        Err(RoomsClientError::UpstreamStatus(status)) if status.as_u16() == 404
    ));
}

#[tokio::test]
async fn when_no_token_is_configured_then_first_listed_room_is_chosen() {
    let base_url = support::ensure_server();

    let chosen = resolve_room_token(&config(base_url, None)).await;
    assert_eq!(chosen.as_deref(), Some(support::MAIN_ROOM_TOKEN));

    let explicit = resolve_room_token(&config(base_url, Some("tok-practice"))).await;
    assert_eq!(explicit.as_deref(), Some("tok-practice"));
}

#[tokio::test]
async fn when_rooms_listing_is_unreachable_then_no_token_is_used() {
    // Reserve a port, then free it so nothing is listening there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let chosen = resolve_room_token(&config(&format!("http://{addr}"), None)).await;
    assert_eq!(chosen, None);
}

// Runtime bootstrap for the spectator client.

use crate::domain::{Color, ConnectionStatus};
use crate::frameworks::config::{self, SpectatorConfig};
use crate::interface_adapters::clients::RoomsClient;
use crate::interface_adapters::net::{ReconnectingTransport, WsConnector, spectate_endpoint};
use crate::interface_adapters::presenters::{LogScoreboard, TeeScoreboard, WatchScoreboard};
use crate::interface_adapters::surface::{FrameImage, Framebuffer};
use crate::use_cases::{ScoreboardView, SpectatorSession, run_session};

use std::{io::Result, sync::Arc};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

const ARENA_BACKGROUND: Color = Color::rgb(0x22, 0x22, 0x2a);

pub fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Picks the room to spectate. A configured token wins; otherwise the first
/// listed room. Listing failures fall back to spectating without a token.
pub async fn resolve_room_token(config: &SpectatorConfig) -> Option<String> {
    if let Some(token) = &config.room_token {
        return Some(token.clone());
    }

    let client = match RoomsClient::new(config.server_url.clone(), config.rooms_timeout) {
        Ok(client) => client,
        Err(error) => {
            warn!(%error, "failed to build rooms client");
            return None;
        }
    };

    match client.first_room().await {
        Ok(Some(room)) => {
            info!(room_id = %room.id, room = %room.name, "spectating first listed room");
            Some(room.token)
        }
        Ok(None) => {
            info!("server lists no rooms; spectating without a room token");
            None
        }
        Err(error) => {
            warn!(%error, "room listing unavailable; spectating without a room token");
            None
        }
    }
}

pub async fn run(config: SpectatorConfig) -> Result<()> {
    let room_token = resolve_room_token(&config).await;
    let endpoint = spectate_endpoint(&config.server_url, room_token.as_deref())
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    info!(%endpoint, backoff_ms = config.reconnect_backoff.as_millis() as u64, "starting spectator");

    let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);
    let (event_tx, event_rx) = mpsc::channel(config::EVENT_CHANNEL_CAPACITY);
    let transport = ReconnectingTransport::new(
        Arc::new(WsConnector),
        endpoint,
        config.reconnect_backoff,
        status_tx,
    )
    .spawn(event_tx);

    let (width, height) = (config.surface_width, config.surface_height);
    let (frame_tx, frame_rx) =
        watch::channel(Arc::new(FrameImage::empty(width, height, ARENA_BACKGROUND)));
    let canvas = Framebuffer::new(width, height, ARENA_BACKGROUND).with_publisher(frame_tx);
    let (watch_sink, scoreboard_rx) = WatchScoreboard::channel();
    let session = SpectatorSession::new(canvas, TeeScoreboard(LogScoreboard, watch_sink));
    let session_task = tokio::spawn(run_session(event_rx, session));

    let presented = present(&config, frame_rx, scoreboard_rx, status_rx).await;

    // Dropping the transport's sender lets the session drain and exit.
    transport.shutdown().await;
    match session_task.await {
        Ok(session) => info!(frames = session.frames_rendered(), "spectator stopped"),
        Err(error) => warn!(%error, "session task failed"),
    }
    presented
}

#[cfg(feature = "window")]
async fn present(
    config: &SpectatorConfig,
    frames: watch::Receiver<Arc<FrameImage>>,
    scoreboard: watch::Receiver<ScoreboardView>,
    status: watch::Receiver<ConnectionStatus>,
) -> Result<()> {
    use crate::frameworks::window::{WindowFeeds, run_window};

    if config.headless {
        return wait_headless(status).await;
    }

    let feeds = WindowFeeds {
        frames,
        scoreboard,
        status,
    };
    let (width, height) = (config.surface_width, config.surface_height);
    tokio::task::block_in_place(|| run_window(feeds, width, height))
}

#[cfg(not(feature = "window"))]
async fn present(
    config: &SpectatorConfig,
    _frames: watch::Receiver<Arc<FrameImage>>,
    _scoreboard: watch::Receiver<ScoreboardView>,
    status: watch::Receiver<ConnectionStatus>,
) -> Result<()> {
    if !config.headless {
        warn!("built without the `window` feature; running headless");
    }
    wait_headless(status).await
}

// Logs status changes until Ctrl-C.
async fn wait_headless(mut status: watch::Receiver<ConnectionStatus>) -> Result<()> {
    info!("running headless; press Ctrl-C to stop");
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("shutdown requested");
                return Ok(());
            }
            changed = status.changed() => {
                if changed.is_err() {
                    // Transport gone; keep waiting for Ctrl-C only.
                    tokio::signal::ctrl_c().await?;
                    return Ok(());
                }
                let current = *status.borrow_and_update();
                info!(status = current.label(), "connection status");
            }
        }
    }
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();
    run(SpectatorConfig::from_env()).await
}

use std::{env, time::Duration};

// Runtime constants and environment-driven settings (not drawing tuning).

pub const EVENT_CHANNEL_CAPACITY: usize = 256;
// Width of the ranked scoreboard panel beside the arena in the window.
pub const SCOREBOARD_PANEL_WIDTH: usize = 260;

pub fn server_url() -> String {
    env::var("SPECTATOR_SERVER_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string())
}

pub fn room_token() -> Option<String> {
    env::var("SPECTATOR_ROOM_TOKEN")
        .ok()
        .filter(|token| !token.trim().is_empty())
}

pub fn reconnect_backoff() -> Duration {
    Duration::from_millis(env_u64("SPECTATOR_RECONNECT_MS", 1000))
}

pub fn surface_size() -> (usize, usize) {
    let width = env_u64("SPECTATOR_SURFACE_WIDTH", 1000).max(1);
    let height = env_u64("SPECTATOR_SURFACE_HEIGHT", 700).max(1);
    (width as usize, height as usize)
}

pub fn headless() -> bool {
    env::var("SPECTATOR_HEADLESS")
        .map(|value| parse_flag(&value))
        .unwrap_or(false)
}

pub fn rooms_timeout() -> Duration {
    Duration::from_millis(env_u64("SPECTATOR_ROOMS_TIMEOUT_MS", 1500))
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Settings for one spectator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpectatorConfig {
    pub server_url: String,
    pub room_token: Option<String>,
    pub reconnect_backoff: Duration,
    pub surface_width: usize,
    pub surface_height: usize,
    pub headless: bool,
    pub rooms_timeout: Duration,
}

impl SpectatorConfig {
    pub fn from_env() -> Self {
        let (surface_width, surface_height) = surface_size();
        Self {
            server_url: server_url(),
            room_token: room_token(),
            reconnect_backoff: reconnect_backoff(),
            surface_width,
            surface_height,
            headless: headless(),
            rooms_timeout: rooms_timeout(),
        }
    }
}

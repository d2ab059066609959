// Connection status state machine driving the status indicator.

use super::canvas::Color;

/// Lifecycle of the single logical connection to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

/// Transport-level events that move the status machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    // A new connection attempt started (initially, or after the backoff elapsed).
    Attempt,
    Opened,
    Closed,
    Failed,
}

impl ConnectionStatus {
    /// Applies a transport event. Every event has a defined target state, so a
    /// late or repeated event can never wedge the machine.
    pub fn on(self, event: TransportEvent) -> ConnectionStatus {
        match event {
            TransportEvent::Attempt => ConnectionStatus::Connecting,
            TransportEvent::Opened => ConnectionStatus::Connected,
            TransportEvent::Closed => ConnectionStatus::Disconnected,
            TransportEvent::Failed => ConnectionStatus::Error,
        }
    }

    /// Text shown by the status indicator.
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting...",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Error => "error!",
        }
    }

    /// Border colour of the status indicator.
    pub fn indicator_color(self) -> Color {
        match self {
            ConnectionStatus::Connecting => Color::GRAY,
            ConnectionStatus::Connected => Color::WHITE,
            ConnectionStatus::Disconnected => Color::ORANGE,
            ConnectionStatus::Error => Color::RED,
        }
    }
}

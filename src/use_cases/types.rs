// Use-case level inputs for the spectator session.

use crate::domain::{TeamDirectory, WorldSnapshot};

/// Decoded inbound message, delivered in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum SpectatorEvent {
    // Replaces the team directory wholesale; never triggers a redraw.
    TeamNames(TeamDirectory),
    // Full world snapshot; always rendered as an independent frame.
    State(WorldSnapshot),
}

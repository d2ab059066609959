// Domain layer: world snapshot types, drawing port and status machine.

pub mod canvas;
pub mod errors;
pub mod geometry;
pub mod scoreboard;
pub mod state;
pub mod status;
pub mod tuning;

pub use canvas::{Canvas, CanvasGuard, Color, Font};
pub use errors::RenderError;
pub use geometry::{Affine, Point};
pub use scoreboard::Scoreboard;
pub use state::{Bounds, Bullet, EntityId, MISSING_LABEL, Ship, TeamDirectory, WorldSnapshot};
pub use status::{ConnectionStatus, TransportEvent};

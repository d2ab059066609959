// Use cases layer: applying decoded events, rendering frames and ranking scores.

pub mod render;
pub mod scoreboard;
pub mod session;
pub mod types;

pub use render::FrameRenderer;
pub use scoreboard::{ScoreboardDiffer, ScoreboardRow, ScoreboardSink, ScoreboardView};
pub use session::{SpectatorSession, run_session};
pub use types::SpectatorEvent;

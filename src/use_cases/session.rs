// Spectator session: applies decoded events to the team directory, the
// frame renderer and the scoreboard differ, one event at a time.

use super::render::FrameRenderer;
use super::scoreboard::{ScoreboardDiffer, ScoreboardSink};
use super::types::SpectatorEvent;
use crate::domain::{Canvas, RenderError, TeamDirectory, WorldSnapshot};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// All process-wide spectator state, owned by a single task.
pub struct SpectatorSession<C, S> {
    directory: TeamDirectory,
    renderer: FrameRenderer,
    differ: ScoreboardDiffer,
    canvas: C,
    sink: S,
    frames_received: u64,
    frames_rendered: u64,
}

impl<C, S> SpectatorSession<C, S>
where
    C: Canvas,
    S: ScoreboardSink,
{
    pub fn new(canvas: C, sink: S) -> Self {
        Self {
            directory: TeamDirectory::default(),
            renderer: FrameRenderer::default(),
            differ: ScoreboardDiffer::new(),
            canvas,
            sink,
            frames_received: 0,
            frames_rendered: 0,
        }
    }

    pub fn with_renderer(mut self, renderer: FrameRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Applies one inbound event. A render failure only affects this frame.
    pub fn apply(&mut self, event: SpectatorEvent) -> Result<(), RenderError> {
        match event {
            SpectatorEvent::TeamNames(directory) => {
                debug!(teams = directory.len(), "team directory replaced");
                self.directory = directory;
                Ok(())
            }
            SpectatorEvent::State(snapshot) => self.render_frame(&snapshot),
        }
    }

    fn render_frame(&mut self, snapshot: &WorldSnapshot) -> Result<(), RenderError> {
        let drawn = self
            .renderer
            .render(&mut self.canvas, snapshot, &self.directory);
        self.canvas.present();
        self.frames_received += 1;
        if drawn.is_ok() {
            self.frames_rendered += 1;
        }

        // Scores are independent of the surface, so a failed draw still updates them.
        self.differ
            .update(&snapshot.scoreboard, &self.directory, &mut self.sink);

        drawn
    }

    pub fn directory(&self) -> &TeamDirectory {
        &self.directory
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// State frames applied, whether or not they drew.
    pub fn frames_received(&self) -> u64 {
        self.frames_received
    }

    /// State frames that drew without error.
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn scoreboard_redraws(&self) -> u64 {
        self.differ.redraws()
    }
}

/// Drains decoded events in arrival order until the transport side hangs up.
pub async fn run_session<C, S>(
    mut events: mpsc::Receiver<SpectatorEvent>,
    mut session: SpectatorSession<C, S>,
) -> SpectatorSession<C, S>
where
    C: Canvas,
    S: ScoreboardSink,
{
    while let Some(event) = events.recv().await {
        if let Err(error) = session.apply(event) {
            warn!(%error, "frame render failed");
        }
    }

    info!(
        frames = session.frames_rendered(),
        failed_frames = session.frames_received() - session.frames_rendered(),
        scoreboard_redraws = session.scoreboard_redraws(),
        "event stream closed; session exiting"
    );
    session
}

// Scoreboard sinks used by the runtime: structured log lines for headless
// runs and a watch channel feeding the window panel.

use crate::domain::{Canvas, CanvasGuard, Color, ConnectionStatus, Font, Point};
use crate::use_cases::{ScoreboardSink, ScoreboardView};
use tokio::sync::watch;
use tracing::info;

const PANEL_FONT: Font = Font::monospace(14.0);
const PANEL_MARGIN: f32 = 10.0;
const PANEL_LINE_HEIGHT: f32 = 20.0;
const STATUS_BOX_HEIGHT: f32 = 24.0;
const PANEL_TEXT: Color = Color::WHITE;

/// Logs one line per ranked row whenever the scoreboard changes.
#[derive(Debug, Default)]
pub struct LogScoreboard;

impl ScoreboardSink for LogScoreboard {
    fn replace(&mut self, view: &ScoreboardView) {
        info!(teams = view.rows.len(), "scoreboard updated");
        for row in &view.rows {
            info!(
                rank = row.rank,
                entity = %row.entity,
                team = %row.label,
                score = %row.padded_score(),
                "scoreboard row"
            );
        }
    }
}

/// Publishes the latest view; readers always see a complete list.
pub struct WatchScoreboard {
    tx: watch::Sender<ScoreboardView>,
}

impl WatchScoreboard {
    pub fn new(tx: watch::Sender<ScoreboardView>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, watch::Receiver<ScoreboardView>) {
        let (tx, rx) = watch::channel(ScoreboardView::default());
        (Self::new(tx), rx)
    }
}

impl ScoreboardSink for WatchScoreboard {
    fn replace(&mut self, view: &ScoreboardView) {
        self.tx.send_replace(view.clone());
    }
}

/// Fans one view out to two sinks.
pub struct TeeScoreboard<A, B>(pub A, pub B);

impl<A: ScoreboardSink, B: ScoreboardSink> ScoreboardSink for TeeScoreboard<A, B> {
    fn replace(&mut self, view: &ScoreboardView) {
        self.0.replace(view);
        self.1.replace(view);
    }
}

/// Draws the status indicator and ranked rows into a side panel surface.
pub fn draw_scoreboard_panel<C: Canvas + ?Sized>(
    canvas: &mut C,
    view: &ScoreboardView,
    status: ConnectionStatus,
) {
    let mut canvas = CanvasGuard::new(canvas);
    canvas.clear();

    let (width, height) = canvas.size();
    let inner_width = (width - 2.0 * PANEL_MARGIN).max(0.0);
    let indicator = status.indicator_color();
    let status_box = [
        Point::new(PANEL_MARGIN, PANEL_MARGIN),
        Point::new(PANEL_MARGIN + inner_width, PANEL_MARGIN),
        Point::new(PANEL_MARGIN + inner_width, PANEL_MARGIN + STATUS_BOX_HEIGHT),
        Point::new(PANEL_MARGIN, PANEL_MARGIN + STATUS_BOX_HEIGHT),
    ];
    canvas.stroke_path(&status_box, true, indicator);
    canvas.fill_text(
        status.label(),
        Point::new(PANEL_MARGIN + 6.0, PANEL_MARGIN + 5.0),
        PANEL_FONT,
        indicator,
    );

    let max_chars = (inner_width / (PANEL_FONT.size * Font::ADVANCE)) as usize;
    let mut y = PANEL_MARGIN + STATUS_BOX_HEIGHT + PANEL_LINE_HEIGHT;
    for row in &view.rows {
        if y + PANEL_LINE_HEIGHT > height {
            break;
        }
        let line = panel_line(row.rank, &row.label, &row.padded_score(), max_chars);
        canvas.fill_text(&line, Point::new(PANEL_MARGIN, y), PANEL_FONT, PANEL_TEXT);
        y += PANEL_LINE_HEIGHT;
    }
}

// "<rank>. <label> <score>", with the label cut so the score stays visible.
fn panel_line(rank: usize, label: &str, score: &str, max_chars: usize) -> String {
    let prefix = format!("{rank}. ");
    let fixed = prefix.chars().count() + 1 + score.chars().count();
    let room = max_chars.saturating_sub(fixed);
    let label: String = label.chars().take(room).collect();
    format!("{prefix}{label} {score}")
}

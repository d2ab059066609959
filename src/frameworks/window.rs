// Native window presenter: arena frame on the left, scoreboard panel with the
// status indicator on the right. Runs on a blocking thread.

use crate::domain::{Color, ConnectionStatus};
use crate::frameworks::config::SCOREBOARD_PANEL_WIDTH;
use crate::interface_adapters::presenters::draw_scoreboard_panel;
use crate::interface_adapters::surface::{FrameImage, Framebuffer};
use crate::use_cases::ScoreboardView;
use minifb::{Key, Window, WindowOptions};
use std::{io, sync::Arc};
use tokio::sync::watch;
use tracing::info;

const PANEL_BACKGROUND: Color = Color::rgb(0x18, 0x18, 0x1c);
const TARGET_FPS: usize = 60;

pub struct WindowFeeds {
    pub frames: watch::Receiver<Arc<FrameImage>>,
    pub scoreboard: watch::Receiver<ScoreboardView>,
    pub status: watch::Receiver<ConnectionStatus>,
}

/// Blocks until the window is closed or Escape is pressed.
pub fn run_window(mut feeds: WindowFeeds, width: usize, height: usize) -> io::Result<()> {
    let total_width = width + SCOREBOARD_PANEL_WIDTH;
    let mut window = Window::new(
        "spectator",
        total_width,
        height,
        WindowOptions::default(),
    )
    .map_err(|err| io::Error::other(err.to_string()))?;
    window.set_target_fps(TARGET_FPS);

    let mut panel = Framebuffer::new(SCOREBOARD_PANEL_WIDTH, height, PANEL_BACKGROUND);
    let mut buffer = vec![0u32; total_width * height];
    let mut panel_dirty = true;

    info!(width = total_width, height, "window opened");
    while window.is_open() && !window.is_key_down(Key::Escape) {
        let status_changed = feeds.status.has_changed().unwrap_or(false);
        let scores_changed = feeds.scoreboard.has_changed().unwrap_or(false);
        if panel_dirty || status_changed || scores_changed {
            let status = *feeds.status.borrow_and_update();
            let view = feeds.scoreboard.borrow_and_update().clone();
            draw_scoreboard_panel(&mut panel, &view, status);
            panel_dirty = false;
        }

        let frame = feeds.frames.borrow().clone();
        compose(&mut buffer, total_width, height, &frame, &panel);

        window
            .update_with_buffer(&buffer, total_width, height)
            .map_err(|err| io::Error::other(err.to_string()))?;
    }

    info!("window closed");
    Ok(())
}

// Copies the arena frame and the panel side by side into `buffer`.
fn compose(
    buffer: &mut [u32],
    total_width: usize,
    height: usize,
    frame: &FrameImage,
    panel: &Framebuffer,
) {
    let arena_width = total_width - SCOREBOARD_PANEL_WIDTH;
    for y in 0..height {
        let row = &mut buffer[y * total_width..(y + 1) * total_width];
        let (arena, side) = row.split_at_mut(arena_width);

        if y < frame.height {
            let copy = arena_width.min(frame.width);
            arena[..copy].copy_from_slice(&frame.pixels[y * frame.width..y * frame.width + copy]);
            arena[copy..].fill(0);
        } else {
            arena.fill(0);
        }

        let panel_row = &panel.pixels()[y * SCOREBOARD_PANEL_WIDTH..(y + 1) * SCOREBOARD_PANEL_WIDTH];
        side.copy_from_slice(panel_row);
    }
}

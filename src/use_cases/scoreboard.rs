// Scoreboard differ: rebuilds the ranked list only when the scores changed.

use crate::domain::{EntityId, Scoreboard, TeamDirectory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreboardRow {
    /// 1-based position after sorting by score.
    pub rank: usize,
    pub entity: EntityId,
    /// Team name with control characters escaped.
    pub label: String,
    pub score: i64,
}

impl ScoreboardRow {
    /// Score left-aligned in a three character column.
    pub fn padded_score(&self) -> String {
        format!("{:<3}", self.score)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreboardView {
    pub rows: Vec<ScoreboardRow>,
}

impl ScoreboardView {
    pub fn build(scoreboard: &Scoreboard, directory: &TeamDirectory) -> Self {
        let rows = scoreboard
            .ranked()
            .into_iter()
            .enumerate()
            .map(|(i, (id, score))| ScoreboardRow {
                rank: i + 1,
                entity: id.clone(),
                label: escape_label(directory.label(id)),
                score,
            })
            .collect();
        Self { rows }
    }
}

/// Destination for rebuilt scoreboards (log, window panel, tests).
pub trait ScoreboardSink {
    fn replace(&mut self, view: &ScoreboardView);
}

/// Escapes control characters so a team name cannot break a display line.
pub fn escape_label(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_control() {
            escaped.extend(ch.escape_default());
        } else {
            escaped.push(ch);
        }
    }
    escaped
}

#[derive(Debug, Default)]
pub struct ScoreboardDiffer {
    // Last scoreboard handed to the sink; owned copy, never shared.
    last: Scoreboard,
    redraws: u64,
}

impl ScoreboardDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a rebuilt view to `sink` if `scoreboard` differs from the last
    /// one shown. Returns whether the sink was touched.
    pub fn update<S: ScoreboardSink + ?Sized>(
        &mut self,
        scoreboard: &Scoreboard,
        directory: &TeamDirectory,
        sink: &mut S,
    ) -> bool {
        if *scoreboard == self.last {
            return false;
        }

        sink.replace(&ScoreboardView::build(scoreboard, directory));
        self.last = scoreboard.clone();
        self.redraws += 1;
        true
    }

    pub fn last(&self) -> &Scoreboard {
        &self.last
    }

    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}

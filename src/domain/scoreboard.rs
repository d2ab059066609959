// Per-snapshot score table with order-independent equality and stable ranking.

use super::state::EntityId;

/// Scores keyed by entity id.
///
/// Entries keep the order they arrived in so ties rank deterministically, while
/// equality compares keys and values only.
#[derive(Debug, Clone, Default)]
pub struct Scoreboard {
    entries: Vec<(EntityId, i64)>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a score; an existing id keeps its original position.
    pub fn insert(&mut self, id: EntityId, score: i64) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, value)) => *value = score,
            None => self.entries.push((id, score)),
        }
    }

    pub fn get(&self, id: &EntityId) -> Option<i64> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, score)| *score)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, i64)> {
        self.entries.iter().map(|(id, score)| (id, *score))
    }

    /// Entries sorted by score, highest first. Ties keep arrival order.
    pub fn ranked(&self) -> Vec<(&EntityId, i64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        // `sort_by` is stable, which is what keeps ties deterministic.
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

impl PartialEq for Scoreboard {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .all(|(id, score)| other.get(id) == Some(*score))
    }
}

impl Eq for Scoreboard {}

impl FromIterator<(EntityId, i64)> for Scoreboard {
    fn from_iter<I: IntoIterator<Item = (EntityId, i64)>>(iter: I) -> Self {
        let mut scoreboard = Scoreboard::new();
        for (id, score) in iter {
            scoreboard.insert(id, score);
        }
        scoreboard
    }
}

// Domain-level world snapshot, entity and team directory types.

use std::collections::HashMap;
use std::fmt;

use super::scoreboard::Scoreboard;

/// Opaque entity identifier shared by ships, bullets, team names and scores.
///
/// The server sends ids as numbers inside entity records and as strings when
/// they are map keys, so both forms normalize to the same canonical string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// Playable arena extent in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when the arena can be mapped onto a surface.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bullet {
    pub id: EntityId,
    pub player_id: EntityId,
    pub x: f32,
    pub y: f32,
    // Carried for completeness; bullets are drawn rotationally symmetric.
    pub angle: f32,
}

/// One complete, self-contained description of the arena at an instant.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldSnapshot {
    pub bounds: Bounds,
    pub players: Vec<Ship>,
    pub bullets: Vec<Bullet>,
    pub scoreboard: Scoreboard,
}

/// Label used when an id has no entry in the team directory.
pub const MISSING_LABEL: &str = "";

/// Display names keyed by entity id, replaced wholesale on every update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamDirectory {
    names: HashMap<EntityId, String>,
}

impl TeamDirectory {
    pub fn new(names: HashMap<EntityId, String>) -> Self {
        Self { names }
    }

    pub fn name(&self, id: &EntityId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Display label for an id; unknown ids get the empty placeholder.
    pub fn label(&self, id: &EntityId) -> &str {
        self.name(id).unwrap_or(MISSING_LABEL)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl FromIterator<(EntityId, String)> for TeamDirectory {
    fn from_iter<I: IntoIterator<Item = (EntityId, String)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

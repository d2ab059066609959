// Wire protocol DTOs and decoding for messages the server pushes to spectators.

use crate::domain::{Bounds, Bullet, EntityId, Scoreboard, Ship, TeamDirectory, WorldSnapshot};
use crate::use_cases::SpectatorEvent;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::value::RawValue;
use std::collections::HashMap;
use std::fmt;

/// Outer envelope: `{ "e": <kind>, "data": <payload> }`. The payload stays
/// raw so map key order survives until the typed decode.
#[derive(Debug, Deserialize)]
struct Envelope<'a> {
    e: String,
    #[serde(borrow, default)]
    data: Option<&'a RawValue>,
}

#[derive(Debug)]
pub enum DecodeError {
    // Frame is not JSON or has no string `e` field.
    Envelope(serde_json::Error),
    // Known kind whose payload does not match its schema.
    Payload {
        kind: &'static str,
        error: serde_json::Error,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Envelope(err) => write!(f, "invalid message envelope: {err}"),
            DecodeError::Payload { kind, error } => {
                write!(f, "invalid {kind} payload: {error}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Team display names keyed by entity id.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct TeamNamesDto(HashMap<String, String>);

impl From<TeamNamesDto> for TeamDirectory {
    fn from(dto: TeamNamesDto) -> Self {
        dto.0
            .into_iter()
            .map(|(id, name)| (EntityId::from(id), name))
            .collect()
    }
}

/// Full world state pushed once per server tick.
#[derive(Debug, Deserialize)]
pub struct StateDto {
    pub bounds: [f32; 2],
    #[serde(default)]
    pub players: Vec<ShipDto>,
    #[serde(default)]
    pub bullets: Vec<BulletDto>,
    #[serde(default)]
    pub scoreboard: ScoreboardDto,
}

impl From<StateDto> for WorldSnapshot {
    fn from(dto: StateDto) -> Self {
        Self {
            bounds: Bounds::new(dto.bounds[0], dto.bounds[1]),
            players: dto.players.into_iter().map(Ship::from).collect(),
            bullets: dto.bullets.into_iter().map(Bullet::from).collect(),
            scoreboard: dto.scoreboard.0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ShipDto {
    #[serde(deserialize_with = "entity_id")]
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub angle: f32,
}

impl From<ShipDto> for Ship {
    fn from(dto: ShipDto) -> Self {
        Self {
            id: dto.id,
            x: dto.x,
            y: dto.y,
            angle: dto.angle,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BulletDto {
    #[serde(deserialize_with = "entity_id")]
    pub id: EntityId,
    #[serde(deserialize_with = "entity_id")]
    pub player_id: EntityId,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub angle: f32,
}

impl From<BulletDto> for Bullet {
    fn from(dto: BulletDto) -> Self {
        Self {
            id: dto.id,
            player_id: dto.player_id,
            x: dto.x,
            y: dto.y,
            angle: dto.angle,
        }
    }
}

/// Score map that keeps wire order (serde_json maps would sort the keys).
#[derive(Debug, Default)]
pub struct ScoreboardDto(Scoreboard);

impl<'de> Deserialize<'de> for ScoreboardDto {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreboardVisitor;

        impl<'de> Visitor<'de> for ScoreboardVisitor {
            type Value = ScoreboardDto;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of entity id to integer score")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut scoreboard = Scoreboard::new();
                while let Some((id, score)) = map.next_entry::<String, i64>()? {
                    scoreboard.insert(EntityId::from(id), score);
                }
                Ok(ScoreboardDto(scoreboard))
            }
        }

        deserializer.deserialize_map(ScoreboardVisitor)
    }
}

// Entity ids arrive as numbers in records and as strings elsewhere.
fn entity_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EntityId, D::Error> {
    struct EntityIdVisitor;

    impl Visitor<'_> for EntityIdVisitor {
        type Value = EntityId;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer or string entity id")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<EntityId, E> {
            Ok(EntityId::from(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<EntityId, E> {
            Ok(EntityId::new(v.to_string()))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<EntityId, E> {
            Ok(EntityId::from(v))
        }
    }

    deserializer.deserialize_any(EntityIdVisitor)
}

/// Decodes one text frame. `Ok(None)` means a well-formed message of a kind
/// the spectator does not consume.
pub fn decode_message(text: &str) -> Result<Option<SpectatorEvent>, DecodeError> {
    let envelope: Envelope<'_> = serde_json::from_str(text).map_err(DecodeError::Envelope)?;
    let payload = envelope.data.map_or("null", RawValue::get);

    match envelope.e.as_str() {
        "teamnames" => decode_payload::<TeamNamesDto>("teamnames", payload)
            .map(|dto| Some(SpectatorEvent::TeamNames(dto.into()))),
        "state" => decode_payload::<StateDto>("state", payload)
            .map(|dto| Some(SpectatorEvent::State(dto.into()))),
        _ => Ok(None),
    }
}

fn decode_payload<T: for<'de> Deserialize<'de>>(
    kind: &'static str,
    payload: &str,
) -> Result<T, DecodeError> {
    serde_json::from_str(payload).map_err(|error| DecodeError::Payload { kind, error })
}

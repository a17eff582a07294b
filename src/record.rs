//! The decoded upstream entity payload.
//!
//! One [`EntityRecord`] is decoded per resolution and discarded once the
//! response envelope is produced. The shape mirrors the upstream REST
//! contract field for field; the graph schema exposes only a curated subset
//! of it (see [`crate::schema`]).

use serde::Deserialize;

use crate::error::FetchError;

/// A name plus the URL of the upstream resource it refers to.
///
/// The upstream API uses this pair everywhere it cross-references another
/// resource.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct NamedResource {
    pub(crate) name: String,
    pub(crate) url: String,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct AbilityEntry {
    pub(crate) slot: i32,
    pub(crate) is_hidden: bool,
    pub(crate) ability: NamedResource,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct StatEntry {
    pub(crate) stat: NamedResource,
    pub(crate) effort: i32,
    pub(crate) base_stat: i32,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct TypeEntry {
    pub(crate) slot: i32,
    #[serde(rename = "type")]
    pub(crate) type_ref: NamedResource,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct MoveEntry {
    #[serde(rename = "move")]
    pub(crate) move_ref: NamedResource,
    pub(crate) version_group_details: Vec<MoveVersionDetail>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct MoveVersionDetail {
    pub(crate) move_learn_method: NamedResource,
    pub(crate) level_learned_at: i32,
    pub(crate) version_group: NamedResource,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct GameIndexEntry {
    pub(crate) game_index: i32,
    pub(crate) version: NamedResource,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct HeldItemEntry {
    pub(crate) item: NamedResource,
    pub(crate) version_details: Vec<HeldItemVersionDetail>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct HeldItemVersionDetail {
    pub(crate) rarity: i32,
    pub(crate) version: NamedResource,
}

/// The named sprite render slots.
///
/// Upstream sends `null` for renders an entity does not have; those decode
/// to `None` so that "no sprite" is distinguishable from an empty URL.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct Sprites {
    pub(crate) front_default: Option<String>,
    pub(crate) front_shiny: Option<String>,
    pub(crate) front_female: Option<String>,
    pub(crate) front_shiny_female: Option<String>,
    pub(crate) back_default: Option<String>,
    pub(crate) back_shiny: Option<String>,
    pub(crate) back_female: Option<String>,
    pub(crate) back_shiny_female: Option<String>,
}

/// The canonical internal representation of one upstream entity, decoded
/// once per resolution.
///
/// Decoding is tolerant of unknown and absent fields (absent fields take
/// their zero value) and strict about type mismatches, which surface as
/// [`FetchError::UpstreamMalformedResponse`] naming the offending path.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub(crate) struct EntityRecord {
    pub(crate) id: i32,
    pub(crate) name: String,
    pub(crate) weight: i32,
    pub(crate) height: i32,
    pub(crate) order: i32,
    // nullable upstream for some entities
    pub(crate) base_experience: Option<i32>,
    pub(crate) is_default: bool,
    pub(crate) forms: Vec<NamedResource>,
    pub(crate) abilities: Vec<AbilityEntry>,
    pub(crate) stats: Vec<StatEntry>,
    pub(crate) types: Vec<TypeEntry>,
    pub(crate) moves: Vec<MoveEntry>,
    pub(crate) sprites: Sprites,
    pub(crate) game_indices: Vec<GameIndexEntry>,
    pub(crate) held_items: Vec<HeldItemEntry>,
    pub(crate) species: NamedResource,
    pub(crate) location_area_encounters: String,
}

impl EntityRecord {
    /// Decode a raw upstream response body into a complete record.
    pub(crate) fn from_bytes(raw: &[u8]) -> Result<EntityRecord, FetchError> {
        let deserializer = &mut serde_json::Deserializer::from_slice(raw);
        serde_path_to_error::deserialize(deserializer).map_err(|err| {
            FetchError::UpstreamMalformedResponse {
                path: err.path().to_string(),
                reason: err.inner().to_string(),
            }
        })
    }
}

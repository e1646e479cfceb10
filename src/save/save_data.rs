//! Save data
//!
//! The on-disk shape of a world: backstory, player, charted locations keyed
//! by `"x,y"`, and the optional enemy.
//!
//! Items are not trusted as stored. Every item list is read back as generic
//! records and promoted through the [`ItemRegistry`], which accepts older
//! tag spellings and fills in any stat a record lacks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::keys::coordinate_map;
use super::store::StoreError;
use crate::combat::{Enemy, Player};
use crate::items::{ItemRecord, ItemRegistry};
use crate::world::{Location, Position, World};

/// Save file version for compatibility checking
pub const SAVE_VERSION: u32 = 1;

fn legacy_version() -> u32 {
    1
}

/// Complete save data structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    #[serde(default = "legacy_version")]
    pub version: u32,
    pub backstory: String,
    pub player: Player,
    #[serde(with = "coordinate_map", default)]
    pub locations: BTreeMap<Position, Location>,
    #[serde(default)]
    pub enemy: Option<Enemy>,
}

impl SaveData {
    pub fn from_world(world: &World) -> Self {
        Self {
            version: SAVE_VERSION,
            backstory: world.backstory.clone(),
            player: world.player.clone(),
            locations: world.locations.clone(),
            enemy: world.enemy.clone(),
        }
    }

    pub fn into_world(self) -> World {
        World::with_locations(self.backstory, self.player, self.locations, self.enemy)
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        serde_json::to_string_pretty(self).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    /// Parse stored text, re-typing every item through the registry
    pub fn from_json(text: &str, registry: &ItemRegistry) -> Result<Self, StoreError> {
        let mut value: Value = serde_json::from_str(text).map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let found = match value.get("version") {
            None | Some(Value::Null) => u64::from(legacy_version()),
            Some(v) => v
                .as_u64()
                .ok_or_else(|| StoreError::Corrupt(format!("version is not a number: {v}")))?,
        };
        if found != u64::from(SAVE_VERSION) {
            return Err(StoreError::VersionMismatch {
                expected: SAVE_VERSION,
                found,
            });
        }

        let mut promoted = 0;
        if let Some(locations) = value.get_mut("locations").and_then(Value::as_object_mut) {
            for location in locations.values_mut() {
                promoted += promote_items(location, registry)?;
            }
        }
        if let Some(player) = value.get_mut("player") {
            promoted += promote_items(player, registry)?;
        }
        if let Some(enemy) = value.get_mut("enemy") {
            promoted += promote_items(enemy, registry)?;
        }
        log::debug!("Re-typed {} stored items", promoted);

        serde_json::from_value(value).map_err(|e| StoreError::Corrupt(e.to_string()))
    }
}

/// Promote the `items` array of an item owner in place
fn promote_items(owner: &mut Value, registry: &ItemRegistry) -> Result<usize, StoreError> {
    match owner.get_mut("items") {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Array(items)) => {
            for item in items.iter_mut() {
                let record: ItemRecord = serde_json::from_value(item.take())
                    .map_err(|e| StoreError::Corrupt(format!("bad item: {e}")))?;
                let typed = registry.typify(record)?;
                *item = serde_json::to_value(typed).map_err(|e| StoreError::Corrupt(e.to_string()))?;
            }
            Ok(items.len())
        }
        Some(other) => Err(StoreError::Corrupt(format!("items is not a list: {other}"))),
    }
}

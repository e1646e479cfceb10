//! Coordinate keys
//!
//! JSON object keys are strings, so grid coordinates are stored as `"x,y"`
//! and decoded back on load. The in-memory map always uses [`Position`].

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

use super::store::StoreError;
use crate::world::{Location, Position};

pub fn encode_key(position: Position) -> String {
    format!("{},{}", position.x, position.y)
}

pub fn decode_key(key: &str) -> Result<Position, StoreError> {
    let bad = || StoreError::BadCoordinate(key.to_string());
    let (x, y) = key.split_once(',').ok_or_else(bad)?;
    let x = x.trim().parse::<i32>().map_err(|_| bad())?;
    let y = y.trim().parse::<i32>().map_err(|_| bad())?;
    Ok(Position::new(x, y))
}

/// `#[serde(with = "coordinate_map")]` for a location map keyed by position
pub mod coordinate_map {
    use super::*;

    pub fn serialize<S: Serializer>(map: &BTreeMap<Position, Location>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(map.iter().map(|(position, location)| (encode_key(*position), location)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<Position, Location>, D::Error> {
        let raw = BTreeMap::<String, Location>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(key, location)| {
                decode_key(&key)
                    .map(|position| (position, location))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}

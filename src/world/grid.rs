//! World grid
//!
//! The coordinate-indexed map of charted locations, the player and the
//! optional active enemy. Coordinates without a location are uncharted and
//! resolve to a shared sentinel.

use std::collections::{BTreeMap, BTreeSet};

use super::location::Location;
use super::position::{Direction, Position};
use crate::combat::{Enemy, Player};

/// The whole world aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub backstory: String,
    pub player: Player,
    pub locations: BTreeMap<Position, Location>,
    pub enemy: Option<Enemy>,
    uncharted: Location,
}

/// Neighbouring locations of a position
#[derive(Debug, Clone, Copy)]
pub struct Exits<'a> {
    pub north: &'a Location,
    pub south: &'a Location,
    pub east: &'a Location,
    pub west: &'a Location,
}

impl<'a> Exits<'a> {
    pub fn get(&self, direction: Direction) -> &'a Location {
        match direction {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    /// Exits in description order (north, east, west, south)
    pub fn iter(self) -> impl Iterator<Item = (Direction, &'a Location)> {
        Direction::ALL.into_iter().map(move |direction| (direction, self.get(direction)))
    }
}

impl World {
    /// A fresh world with nothing charted and no enemy
    pub fn new(backstory: impl Into<String>, player: Player) -> Self {
        Self::with_locations(backstory, player, BTreeMap::new(), None)
    }

    /// Rebuild a world from stored parts. Sentinel entries are dropped.
    pub fn with_locations(
        backstory: impl Into<String>,
        player: Player,
        mut locations: BTreeMap<Position, Location>,
        enemy: Option<Enemy>,
    ) -> Self {
        locations.retain(|_, location| !location.is_uncharted());
        Self {
            backstory: backstory.into(),
            player,
            locations,
            enemy,
            uncharted: Location::uncharted(),
        }
    }

    /// Location at `position`, or the uncharted sentinel
    pub fn location(&self, position: Position) -> &Location {
        self.locations.get(&position).unwrap_or(&self.uncharted)
    }

    pub fn charted(&self, position: Position) -> Option<&Location> {
        self.locations.get(&position)
    }

    pub fn charted_mut(&mut self, position: Position) -> Option<&mut Location> {
        self.locations.get_mut(&position)
    }

    pub fn is_charted(&self, position: Position) -> bool {
        self.locations.contains_key(&position)
    }

    pub fn uncharted(&self) -> &Location {
        &self.uncharted
    }

    /// Store a newly generated location.
    ///
    /// Returns false and changes nothing when the coordinate is already charted
    /// or the location is the sentinel.
    pub fn chart(&mut self, position: Position, location: Location) -> bool {
        if location.is_uncharted() || self.is_charted(position) {
            return false;
        }
        self.locations.insert(position, location);
        true
    }

    pub fn exits(&self, position: Position) -> Exits<'_> {
        Exits {
            north: self.location(position.step(Direction::North)),
            south: self.location(position.step(Direction::South)),
            east: self.location(position.step(Direction::East)),
            west: self.location(position.step(Direction::West)),
        }
    }

    /// Summary of every exit, keyed by direction
    pub fn exit_summaries(&self, position: Position, include_descriptions: bool) -> BTreeMap<Direction, String> {
        self.exits(position)
            .iter()
            .map(|(direction, location)| (direction, location.summary(include_descriptions)))
            .collect()
    }

    /// "To the north is ..." lines, one per exit
    pub fn describe_exits(&self, position: Position, include_descriptions: bool) -> String {
        self.exits(position)
            .iter()
            .map(|(direction, location)| {
                if include_descriptions {
                    format!("To the {} is {} {}", direction, location.name, location.description)
                } else {
                    format!("To the {} is {}", direction, location.name)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Names of all charted locations
    pub fn used_names(&self) -> BTreeSet<String> {
        self.locations.values().map(|location| location.name.clone()).collect()
    }

    pub fn player_location(&self) -> &Location {
        self.location(self.player.position())
    }

    pub fn player_location_mut(&mut self) -> Option<&mut Location> {
        let position = self.player.position();
        self.locations.get_mut(&position)
    }

    pub fn has_enemy(&self) -> bool {
        self.enemy.is_some()
    }
}

//! Combatants
//!
//! Stats, health and inventory shared by the player and enemies.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::items::{ImageRef, Item, Weapon};
use crate::items::rolls::{roll_ability, roll_level};
use crate::world::{Direction, Location, Position};

/// Shared combat stats.
///
/// `health` and `mana` are fractions of their maximum, not absolute points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub strength: i32,
    pub agility: i32,
    pub intelligence: i32,
    #[serde(alias = "consitution")]
    pub constitution: i32,
    pub level: i32,
    #[serde(default)]
    pub experience: i32,
    #[serde(default = "full")]
    pub health: f64,
    #[serde(default = "full")]
    pub mana: f64,
    #[serde(default)]
    pub items: Vec<Item>,
}

fn full() -> f64 {
    1.0
}

impl Combatant {
    pub fn new(strength: i32, agility: i32, intelligence: i32, constitution: i32, level: i32) -> Self {
        Self {
            strength,
            agility,
            intelligence,
            constitution,
            level,
            experience: 0,
            health: 1.0,
            mana: 1.0,
            items: Vec::new(),
        }
    }

    /// Random abilities (1-20) and level (1-10), full health and mana
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let strength = roll_ability(rng);
        let agility = roll_ability(rng);
        let intelligence = roll_ability(rng);
        let constitution = roll_ability(rng);
        Self::new(strength, agility, intelligence, constitution, roll_level(rng))
    }

    pub fn max_health(&self) -> i32 {
        self.constitution * self.level
    }

    pub fn max_mana(&self) -> i32 {
        self.intelligence * self.level
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0.0
    }

    /// First weapon carried, if any
    pub fn weapon(&self) -> Option<&Weapon> {
        self.items.iter().find_map(Item::as_weapon)
    }

    /// Total defence of all carried armour
    pub fn armour_defence(&self) -> i32 {
        self.items.iter().map(Item::defence).sum()
    }

    pub fn find_item(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.name == name)
    }
}

/// Result of moving an item between owners
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Moved(String),
    NotFound(String),
}

impl TransferOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, TransferOutcome::Moved(_))
    }
}

/// Remove the first item named `name` from `from` and append it to `to`
fn transfer(name: &str, from: &mut Vec<Item>, to: &mut Vec<Item>) -> TransferOutcome {
    match from.iter().position(|item| item.name == name) {
        Some(index) => {
            let item = from.remove(index);
            to.push(item);
            TransferOutcome::Moved(name.to_string())
        }
        None => TransferOutcome::NotFound(name.to_string()),
    }
}

/// The player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(flatten)]
    pub combatant: Combatant,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
}

impl Player {
    pub fn new(combatant: Combatant) -> Self {
        Self { combatant, x: 0, y: 0 }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Translate without bounds; the grid has no edges
    pub fn move_by(&mut self, dx: i32, dy: i32) {
        let to = self.position().offset(dx, dy);
        self.x = to.x;
        self.y = to.y;
    }

    pub fn step(&mut self, direction: Direction) {
        let (dx, dy) = direction.delta();
        self.move_by(dx, dy);
    }

    /// Pick up an item from `location` by exact name
    pub fn take_item(&mut self, name: &str, location: &mut Location) -> TransferOutcome {
        let outcome = transfer(name, &mut location.items, &mut self.combatant.items);
        match &outcome {
            TransferOutcome::Moved(_) => log::info!("Took '{}' from {}", name, location.name),
            TransferOutcome::NotFound(_) => log::debug!("No '{}' in {}", name, location.name),
        }
        outcome
    }

    /// Leave a carried item in `location`
    pub fn drop_item(&mut self, name: &str, location: &mut Location) -> TransferOutcome {
        let outcome = transfer(name, &mut self.combatant.items, &mut location.items);
        match &outcome {
            TransferOutcome::Moved(_) => log::info!("Dropped '{}' in {}", name, location.name),
            TransferOutcome::NotFound(_) => log::debug!("Not carrying '{}'", name),
        }
        outcome
    }
}

/// The enemy currently facing the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    #[serde(flatten)]
    pub combatant: Combatant,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
}

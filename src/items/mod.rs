//! Item system

pub mod item;
pub mod registry;
pub mod rolls;

pub use item::{
    Armour, Damage, Gem, ImageRef, Item, ItemError, ItemKind, ItemRecord, ItemStats, Money, Potion, Relic,
    Spellbook, Weapon,
};
pub use registry::{typify_with, ItemRegistry};

//! Delvewright - A rogue-like whose world is written as you walk it
//!
//! Every step into the unknown asks a content generator for a new place,
//! and sometimes for something that wants you dead.

pub mod combat;
pub mod content;
pub mod dice;
pub mod game;
pub mod items;
pub mod save;
pub mod world;

// Re-export commonly used types
pub use game::{Game, GameConfig, GameError};
pub use world::{Direction, Location, Position, World};

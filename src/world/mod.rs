//! World module
//!
//! The coordinate grid of locations, world creation and on-demand
//! location generation.

pub mod factory;
pub mod generator;
pub mod grid;
pub mod location;
pub mod position;
pub mod shared;

pub use factory::WorldFactory;
pub use generator::LocationGenerator;
pub use grid::{Exits, World};
pub use location::Location;
pub use position::{Direction, Position};
pub use shared::SharedWorld;

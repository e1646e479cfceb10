//! Grid coordinates and compass directions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Position on the unbounded world grid. North is +y, east is +x.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translated position. Wraps at the i32 edges instead of panicking.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.wrapping_add(dx), self.y.wrapping_add(dy))
    }

    /// Neighbour one step away
    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// Manhattan distance to another position
    pub fn distance(&self, other: &Position) -> i64 {
        (self.x as i64 - other.x as i64).abs() + (self.y as i64 - other.y as i64).abs()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four exits of a location
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    West,
    South,
}

impl Direction {
    /// In the order exits are described
    pub const ALL: [Direction; 4] = [Direction::North, Direction::East, Direction::West, Direction::South];

    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::South => (0, -1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Direction::North),
            "s" | "south" => Ok(Direction::South),
            "e" | "east" => Ok(Direction::East),
            "w" | "west" => Ok(Direction::West),
            other => Err(format!("Unknown direction: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_directions() {
        let origin = Position::default();
        assert_eq!(origin.step(Direction::North), Position::new(0, 1));
        assert_eq!(origin.step(Direction::South), Position::new(0, -1));
        assert_eq!(origin.step(Direction::East), Position::new(1, 0));
        assert_eq!(origin.step(Direction::West), Position::new(-1, 0));
    }

    #[test]
    fn test_offset_wraps_at_edges() {
        let edge = Position::new(i32::MAX, 0);
        assert_eq!(edge.step(Direction::East), Position::new(i32::MIN, 0));
    }

    #[test]
    fn test_parse_direction() {
        assert_eq!("n".parse::<Direction>(), Ok(Direction::North));
        assert_eq!(" West ".parse::<Direction>(), Ok(Direction::West));
        assert!("up".parse::<Direction>().is_err());
    }

    #[test]
    fn test_distance() {
        assert_eq!(Position::new(-2, 3).distance(&Position::new(1, -1)), 7);
    }
}

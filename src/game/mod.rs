//! Game module - Configuration and the command session

pub mod config;
pub mod session;

pub use config::{read_token, ConfigError, EngineConfig, GameConfig, DEFAULT_CONFIG_FILE};
pub use session::{ActionReport, CommandStates, Game, GameError, MoveOutcome};

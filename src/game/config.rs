//! Game configuration
//!
//! Loaded from a RON file. A missing file means defaults; a malformed one is
//! a startup error.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::encounter::DEFAULT_ENCOUNTER_CHANCE;
use crate::content::openai::DEFAULT_OPENAI_BASE_URL;
use crate::save::default_save_path;
use crate::world::generator::{DEFAULT_ITEM_CHANCE, DEFAULT_NAME_ATTEMPTS};

/// Default config file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Which content backend to use
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EngineConfig {
    /// Offline random words and scribbles
    #[default]
    Placeholder,
    /// OpenAI-compatible HTTP API
    OpenAi {
        #[serde(default = "default_base_url")]
        base_url: String,
        text_model: String,
        image_model: String,
        /// File holding the bearer token
        token_file: PathBuf,
    },
}

fn default_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Where the world is saved; `None` means the per-user data directory
    pub save_file: Option<PathBuf>,
    pub engine: EngineConfig,
    /// Chance of an enemy after each move
    pub encounter_chance: f64,
    /// Chance that a new location holds an item
    pub item_chance: f64,
    /// Bound on each content generator call
    pub generation_timeout_secs: u64,
    /// Tries at getting an unused location name
    pub name_attempts: u32,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
    /// Save after every command that changes the world
    pub autosave: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            save_file: None,
            engine: EngineConfig::Placeholder,
            encounter_chance: DEFAULT_ENCOUNTER_CHANCE,
            item_chance: DEFAULT_ITEM_CHANCE,
            generation_timeout_secs: 120,
            name_attempts: DEFAULT_NAME_ATTEMPTS,
            seed: None,
            autosave: true,
        }
    }
}

impl GameConfig {
    /// Load from `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        ron::from_str(content).map_err(|e| e.to_string())
    }

    pub fn save_path(&self) -> PathBuf {
        self.save_file.clone().unwrap_or_else(default_save_path)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs.max(1))
    }
}

/// Read a bearer token, trimmed of surrounding whitespace
pub async fn read_token(path: &Path) -> Result<String, ConfigError> {
    tokio::fs::read_to_string(path)
        .await
        .map(|token| token.trim().to_string())
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.encounter_chance, 0.1);
        assert_eq!(config.item_chance, 0.5);
        assert_eq!(config.generation_timeout(), Duration::from_secs(120));
        assert_eq!(config.engine, EngineConfig::Placeholder);
        assert!(config.autosave);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = GameConfig::parse("(encounter_chance: 0.25, seed: Some(42))").unwrap();
        assert_eq!(config.encounter_chance, 0.25);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.item_chance, 0.5);
    }

    #[test]
    fn test_openai_engine() {
        let config = GameConfig::parse(
            r#"(engine: OpenAi(text_model: "gpt-4o-mini", image_model: "dall-e-2", token_file: "token.txt"))"#,
        )
        .unwrap();
        match config.engine {
            EngineConfig::OpenAi { base_url, text_model, .. } => {
                assert_eq!(base_url, DEFAULT_OPENAI_BASE_URL);
                assert_eq!(text_model, "gpt-4o-mini");
            }
            other => panic!("unexpected engine {other:?}"),
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = GameConfig::load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");
        std::fs::write(&path, "(encounter_chance: \"often\")").unwrap();
        assert!(matches!(GameConfig::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_read_token_trims() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.txt");
        std::fs::write(&path, "  sk-secret\n").unwrap();
        assert_eq!(read_token(&path).await.unwrap(), "sk-secret");
    }
}

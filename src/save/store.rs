//! World store
//!
//! A single keyed record holding the whole world. The file store writes
//! through a temporary file and renames it into place so a crash mid-save
//! never leaves a truncated world behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;

use super::save_data::SaveData;
use crate::content::GenerationError;
use crate::items::{ItemError, ItemRegistry};
use crate::world::{World, WorldFactory};

/// Persistence errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corrupt save data: {0}")]
    Corrupt(String),
    #[error("Bad coordinate key: {0:?}")]
    BadCoordinate(String),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u64 },
    #[error(transparent)]
    Item(#[from] ItemError),
    #[error("Could not create a new world: {0}")]
    Generation(#[from] GenerationError),
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Durable home of the serialized world
#[async_trait]
pub trait WorldStore: Send + Sync {
    /// Stored text, or `None` when nothing (or only whitespace) is stored
    async fn read(&self) -> Result<Option<String>, StoreError>;

    async fn write(&self, contents: &str) -> Result<(), StoreError>;

    /// Remove the record. Removing a missing record is not an error.
    async fn delete(&self) -> Result<(), StoreError>;
}

/// Get the default save file path
pub fn default_save_path() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "delvewright", "Delvewright") {
        let mut path = proj_dirs.data_local_dir().to_path_buf();
        path.push("saves");
        path.push("world.json");
        path
    } else {
        // Fallback to current directory
        PathBuf::from("./saves/world.json")
    }
}

/// The world as a JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(default_save_path())
    }
}

#[async_trait]
impl WorldStore for JsonFileStore {
    async fn read(&self) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(None),
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    async fn write(&self, contents: &str) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| StoreError::io(dir, e))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, contents)
            .await
            .map_err(|e| StoreError::io(&temp, e))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;
        Ok(())
    }

    async fn delete(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                log::info!("Deleted save {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }
}

/// In-memory store, for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().clone()
    }
}

#[async_trait]
impl WorldStore for MemoryStore {
    async fn read(&self) -> Result<Option<String>, StoreError> {
        Ok(self.contents().filter(|c| !c.trim().is_empty()))
    }

    async fn write(&self, contents: &str) -> Result<(), StoreError> {
        *self.contents.lock() = Some(contents.to_string());
        Ok(())
    }

    async fn delete(&self) -> Result<(), StoreError> {
        *self.contents.lock() = None;
        Ok(())
    }
}

// ============================================================================
// World load/save
// ============================================================================

/// Load the stored world, re-typing every item. `None` when the store is empty.
pub async fn load_world(store: &dyn WorldStore, registry: &ItemRegistry) -> Result<Option<World>, StoreError> {
    let Some(contents) = store.read().await? else {
        return Ok(None);
    };
    let data = SaveData::from_json(&contents, registry)?;
    let world = data.into_world();
    log::info!("World loaded ({} locations charted)", world.locations.len());
    Ok(Some(world))
}

pub async fn save_world(store: &dyn WorldStore, world: &World) -> Result<(), StoreError> {
    let contents = SaveData::from_world(world).to_json()?;
    store.write(&contents).await?;
    log::info!("World saved ({} locations charted)", world.locations.len());
    Ok(())
}

/// Load the stored world, or bootstrap a new one and persist it immediately.
///
/// A corrupt store is an error, never silently replaced.
pub async fn load_or_create(
    store: &dyn WorldStore,
    registry: &ItemRegistry,
    factory: &WorldFactory,
) -> Result<World, StoreError> {
    if let Some(world) = load_world(store, registry).await? {
        return Ok(world);
    }

    log::info!("No saved world found, creating a new one");
    let world = factory.create_world().await?;
    save_world(store, &world).await?;
    Ok(world)
}

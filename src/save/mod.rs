//! Save/load system
//!
//! Persists the whole world as one JSON record and bootstraps a new world
//! when nothing is stored.

pub mod keys;
pub mod save_data;
pub mod store;

pub use keys::{decode_key, encode_key};
pub use save_data::{SaveData, SAVE_VERSION};
pub use store::{
    default_save_path, load_or_create, load_world, save_world, JsonFileStore, MemoryStore, StoreError, WorldStore,
};

//! Content generator seam
//!
//! Everything narrative (names, descriptions, backstory, pictures) comes from
//! a [`ContentGenerator`]. Calls are slow remote requests that may fail; a
//! failure is always recoverable and leaves the world untouched.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::items::{ImageRef, ItemError, ItemKind};
use crate::world::Direction;

/// Pixel size requested for item and enemy portraits
pub const ITEM_IMAGE_SIZE: ImageSize = ImageSize { width: 128, height: 128 };

/// Name and description of a generated thing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sketch {
    pub name: String,
    pub description: String,
}

impl Sketch {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Requested image dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Context for inventing a new location
#[derive(Debug, Clone, Default)]
pub struct LocationBrief {
    pub backstory: String,
    /// Summary of each neighbour ("uncharted ..." when unknown)
    pub exits: BTreeMap<Direction, String>,
    /// Location names already used anywhere in the world
    pub used_names: BTreeSet<String>,
}

/// Content generation failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    #[error("Content request failed: {0}")]
    Request(String),
    #[error("Invalid content response: {0}")]
    InvalidResponse(String),
    #[error("Content generation timed out after {0:?}")]
    TimedOut(Duration),
    #[error("Generated name is already taken: {0}")]
    DuplicateName(String),
    #[error("The world was reset while content was being generated")]
    Superseded,
    #[error(transparent)]
    Item(#[from] ItemError),
}

/// External producer of narrative text and images
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn create_backstory(&self) -> Result<String, GenerationError>;

    async fn create_location(&self, brief: &LocationBrief) -> Result<Sketch, GenerationError>;

    async fn create_item_of_type(&self, backstory: &str, kind: ItemKind) -> Result<Sketch, GenerationError>;

    async fn create_enemy(&self, backstory: &str, surroundings: &str) -> Result<Sketch, GenerationError>;

    async fn render_image(&self, description: &str, size: Option<ImageSize>) -> Result<ImageRef, GenerationError>;
}

//! Locations
//!
//! A charted square of the world grid and the items lying in it.

use serde::{Deserialize, Serialize};

use crate::items::{ImageRef, Item};

const UNCHARTED_NAME: &str = "uncharted";
const UNCHARTED_DESCRIPTION: &str = "this location has not been discovered yet";

/// A location on the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Location {
    pub fn new(name: impl Into<String>, description: impl Into<String>, image: Option<ImageRef>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image,
            items: Vec::new(),
        }
    }

    /// Sentinel standing in for every coordinate that has not been generated
    pub fn uncharted() -> Self {
        Self::new(UNCHARTED_NAME, UNCHARTED_DESCRIPTION, None)
    }

    pub fn is_uncharted(&self) -> bool {
        self.name == UNCHARTED_NAME && self.description == UNCHARTED_DESCRIPTION && self.items.is_empty()
    }

    pub fn find_item(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.name == name)
    }

    /// One-line "name: description" summary
    pub fn summary(&self, include_description: bool) -> String {
        if include_description {
            format!("{}: {}", self.name, self.description)
        } else {
            self.name.clone()
        }
    }
}

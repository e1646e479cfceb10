//! Deadline wrapper
//!
//! Bounds every content call. An expired call is a `TimedOut` generation
//! failure, never a hang.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use super::generator::{ContentGenerator, GenerationError, ImageSize, LocationBrief, Sketch};
use crate::items::{ImageRef, ItemKind};

pub struct Deadline<G> {
    inner: G,
    limit: Duration,
}

impl<G: ContentGenerator> Deadline<G> {
    pub fn new(inner: G, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T, GenerationError>>) -> Result<T, GenerationError> {
        match tokio::time::timeout(self.limit, call).await {
            Ok(result) => result,
            Err(_) => {
                log::warn!("Content generation exceeded {:?}", self.limit);
                Err(GenerationError::TimedOut(self.limit))
            }
        }
    }
}

#[async_trait]
impl<G: ContentGenerator> ContentGenerator for Deadline<G> {
    async fn create_backstory(&self) -> Result<String, GenerationError> {
        self.bounded(self.inner.create_backstory()).await
    }

    async fn create_location(&self, brief: &LocationBrief) -> Result<Sketch, GenerationError> {
        self.bounded(self.inner.create_location(brief)).await
    }

    async fn create_item_of_type(&self, backstory: &str, kind: ItemKind) -> Result<Sketch, GenerationError> {
        self.bounded(self.inner.create_item_of_type(backstory, kind)).await
    }

    async fn create_enemy(&self, backstory: &str, surroundings: &str) -> Result<Sketch, GenerationError> {
        self.bounded(self.inner.create_enemy(backstory, surroundings)).await
    }

    async fn render_image(&self, description: &str, size: Option<ImageSize>) -> Result<ImageRef, GenerationError> {
        self.bounded(self.inner.render_image(description, size)).await
    }
}

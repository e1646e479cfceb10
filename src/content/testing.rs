//! Scripted content generator for tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::generator::{ContentGenerator, GenerationError, ImageSize, LocationBrief, Sketch};
use crate::items::{ImageRef, ItemKind};

/// Predictable generator: numbered names, optional delay, failure switch
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    pub delay: Option<Duration>,
    /// Names handed out for locations before falling back to numbering
    pub location_names: Mutex<Vec<String>>,
    pub fail: AtomicBool,
    pub location_calls: AtomicUsize,
    pub item_calls: AtomicUsize,
    pub enemy_calls: AtomicUsize,
    pub backstory_calls: AtomicUsize,
    pub image_calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Queue location names, served first to last
    pub fn with_location_names(names: &[&str]) -> Self {
        let queued = names.iter().rev().map(|n| n.to_string()).collect();
        Self {
            location_names: Mutex::new(queued),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn locations(&self) -> usize {
        self.location_calls.load(Ordering::SeqCst)
    }

    async fn step(&self) -> Result<(), GenerationError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(GenerationError::Request("scripted failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentGenerator for ScriptedGenerator {
    async fn create_backstory(&self) -> Result<String, GenerationError> {
        let n = self.backstory_calls.fetch_add(1, Ordering::SeqCst);
        self.step().await?;
        Ok(format!("Backstory #{n}"))
    }

    async fn create_location(&self, _brief: &LocationBrief) -> Result<Sketch, GenerationError> {
        let n = self.location_calls.fetch_add(1, Ordering::SeqCst);
        self.step().await?;
        let name = self.location_names.lock().pop().unwrap_or_else(|| format!("Place {n}"));
        Ok(Sketch::new(name, format!("Description of place {n}")))
    }

    async fn create_item_of_type(&self, _backstory: &str, kind: ItemKind) -> Result<Sketch, GenerationError> {
        let n = self.item_calls.fetch_add(1, Ordering::SeqCst);
        self.step().await?;
        Ok(Sketch::new(format!("{kind} {n}"), format!("A plain {kind}")))
    }

    async fn create_enemy(&self, _backstory: &str, surroundings: &str) -> Result<Sketch, GenerationError> {
        let n = self.enemy_calls.fetch_add(1, Ordering::SeqCst);
        self.step().await?;
        Ok(Sketch::new(format!("Foe {n}"), format!("Lurks in {surroundings}")))
    }

    async fn render_image(&self, description: &str, _size: Option<ImageSize>) -> Result<ImageRef, GenerationError> {
        self.image_calls.fetch_add(1, Ordering::SeqCst);
        self.step().await?;
        Ok(ImageRef::new(format!("image:{description}")))
    }
}

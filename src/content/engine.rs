//! Chat engine seam
//!
//! A minimal chat-completion and text-to-image interface. Prompting lives in
//! [`super::prompted::PromptedGenerator`]; engines only move messages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::generator::{GenerationError, ImageSize};
use crate::items::ImageRef;

/// Who is speaking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Ordered conversation sent to a chat engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatContext {
    pub messages: Vec<ChatMessage>,
}

impl ChatContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) -> &mut Self {
        self.messages.push(ChatMessage {
            role,
            content: content.into(),
        });
        self
    }

    pub fn system(&mut self, content: impl Into<String>) -> &mut Self {
        self.push(Role::System, content)
    }

    pub fn user(&mut self, content: impl Into<String>) -> &mut Self {
        self.push(Role::User, content)
    }

    pub fn assistant(&mut self, content: impl Into<String>) -> &mut Self {
        self.push(Role::Assistant, content)
    }

    /// Whether any message mentions `needle`
    pub fn mentions(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.content.contains(needle))
    }
}

/// Text and image model backend
#[async_trait]
pub trait ChatEngine: Send + Sync {
    async fn complete(&self, context: &ChatContext) -> Result<String, GenerationError>;

    async fn text_to_image(&self, prompt: &str, size: Option<ImageSize>) -> Result<ImageRef, GenerationError>;
}

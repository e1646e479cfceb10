//! Content generation
//!
//! The [`ContentGenerator`] seam and its adapters: prompted chat engines
//! (OpenAI-compatible or the offline placeholder) and a deadline wrapper.

pub mod deadline;
pub mod engine;
pub mod generator;
pub mod openai;
pub mod placeholder;
pub mod prompted;

#[cfg(test)]
pub mod testing;

pub use deadline::Deadline;
pub use engine::{ChatContext, ChatEngine, ChatMessage, Role};
pub use generator::{ContentGenerator, GenerationError, ImageSize, LocationBrief, Sketch, ITEM_IMAGE_SIZE};
pub use openai::OpenAiEngine;
pub use placeholder::PlaceholderEngine;
pub use prompted::PromptedGenerator;

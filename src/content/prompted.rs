//! Prompted content generator
//!
//! Builds narrative prompts for a [`ChatEngine`] and parses its JSON replies.

use async_trait::async_trait;

use super::engine::{ChatContext, ChatEngine};
use super::generator::{ContentGenerator, GenerationError, ImageSize, LocationBrief, Sketch};
use crate::items::{ImageRef, ItemKind};

const GAME_PREMISE: &str = "You are playing a fantasy rogue-like game.";

const JSON_REPLY: &str =
    r#"Give the response in this JSON format: {"name": "<the name>", "description": "<the description>"}"#;

/// [`ContentGenerator`] on top of any chat engine
pub struct PromptedGenerator<E> {
    engine: E,
}

impl<E: ChatEngine> PromptedGenerator<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    async fn sketch(&self, context: &ChatContext) -> Result<Sketch, GenerationError> {
        let reply = self.engine.complete(context).await?;
        parse_sketch(&reply)
    }
}

/// Parse a `{"name", "description"}` reply.
///
/// Models like to wrap JSON in a fenced block or add a sentence around it,
/// so the outermost braces are used.
pub fn parse_sketch(reply: &str) -> Result<Sketch, GenerationError> {
    let start = reply.find('{');
    let end = reply.rfind('}');
    let body = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => return Err(GenerationError::InvalidResponse(format!("no JSON object in reply: {reply}"))),
    };

    let sketch: Sketch =
        serde_json::from_str(body).map_err(|e| GenerationError::InvalidResponse(format!("{e}: {body}")))?;
    if sketch.name.trim().is_empty() {
        return Err(GenerationError::InvalidResponse("empty name".to_string()));
    }
    Ok(Sketch::new(sketch.name.trim(), sketch.description.trim()))
}

fn exits_context(brief: &LocationBrief) -> String {
    brief
        .exits
        .iter()
        .map(|(direction, summary)| format!("{direction}: {summary}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl<E: ChatEngine> ContentGenerator for PromptedGenerator<E> {
    async fn create_backstory(&self) -> Result<String, GenerationError> {
        let mut context = ChatContext::new();
        context.system(GAME_PREMISE).user(
            "Come up with a backstory for the game that will allow cohesive generation of locations and items. \
             The tone should be of a narrator to a player, so avoid meta talk. \
             Do not mention inventory, or ask what to do next. Just describe the backstory itself.",
        );
        let backstory = self.engine.complete(&context).await?;
        Ok(backstory.trim().to_string())
    }

    async fn create_location(&self, brief: &LocationBrief) -> Result<Sketch, GenerationError> {
        let taken: Vec<&str> = brief.used_names.iter().map(String::as_str).collect();
        let mut context = ChatContext::new();
        context
            .system(GAME_PREMISE)
            .system(format!("Backstory: {}", brief.backstory))
            .system("You are looking about a new location you have discovered.")
            .system(format!(
                "These are the surrounding locations. Make the new location consistent with its known (charted) surrounds:\n{}",
                exits_context(brief)
            ))
            .system(format!(
                "Come up with a short, unique name for this location. The following names are already taken: {taken:?}"
            ))
            .system("Also describe what you see in this location only (do not describe exits, or other locations). Do not describe items.")
            .user(JSON_REPLY);
        self.sketch(&context).await
    }

    async fn create_item_of_type(&self, backstory: &str, kind: ItemKind) -> Result<Sketch, GenerationError> {
        let mut context = ChatContext::new();
        context
            .system(GAME_PREMISE)
            .system(format!("Backstory: {backstory}"))
            .system(format!("You have found a new {kind} at the current game location."))
            .system("Come up with a short, unique name for this item. Example: 'Ebony Sword'")
            .system(format!(
                "Also describe the {kind} you have just found. Describe ONLY the {kind}, not its surrounds, stats, or any sidequest."
            ))
            .user(JSON_REPLY);
        self.sketch(&context).await
    }

    async fn create_enemy(&self, backstory: &str, surroundings: &str) -> Result<Sketch, GenerationError> {
        let mut context = ChatContext::new();
        context
            .system(GAME_PREMISE)
            .system(format!("Backstory: {backstory}"))
            .system(format!("You have just encountered an enemy. Location: {surroundings}"))
            .system("Come up with a short, unique name for this enemy. Example: 'Flesh Reaping Worm'")
            .system("Also describe the enemy. Describe ONLY the enemy, not its surrounds, stats, or any sidequest.")
            .user(JSON_REPLY);
        self.sketch(&context).await
    }

    async fn render_image(&self, description: &str, size: Option<ImageSize>) -> Result<ImageRef, GenerationError> {
        self.engine.text_to_image(description, size).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Direction;
    use parking_lot::Mutex;

    /// Replays one canned reply and records every context it saw
    struct EchoEngine {
        reply: String,
        seen: Mutex<Vec<ChatContext>>,
    }

    impl EchoEngine {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatEngine for EchoEngine {
        async fn complete(&self, context: &ChatContext) -> Result<String, GenerationError> {
            self.seen.lock().push(context.clone());
            Ok(self.reply.clone())
        }

        async fn text_to_image(&self, prompt: &str, size: Option<ImageSize>) -> Result<ImageRef, GenerationError> {
            let size = size.map(|s| format!("{}x{}", s.width, s.height)).unwrap_or_default();
            Ok(ImageRef::new(format!("{prompt}@{size}")))
        }
    }

    #[test]
    fn test_parse_plain_json() {
        let sketch = parse_sketch(r#"{"name": "Ebony Sword", "description": "Black."}"#).unwrap();
        assert_eq!(sketch, Sketch::new("Ebony Sword", "Black."));
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = "Sure!\n```json\n{\"name\": \" Moss Hall \", \"description\": \"Green.\"}\n```";
        assert_eq!(parse_sketch(reply).unwrap(), Sketch::new("Moss Hall", "Green."));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_sketch("no json here"), Err(GenerationError::InvalidResponse(_))));
        assert!(matches!(parse_sketch(r#"{"title": "x"}"#), Err(GenerationError::InvalidResponse(_))));
        assert!(matches!(
            parse_sketch(r#"{"name": " ", "description": "x"}"#),
            Err(GenerationError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_location_prompt_carries_context() {
        let generator = PromptedGenerator::new(EchoEngine::new(r#"{"name":"Crypt","description":"Cold."}"#));
        let mut brief = LocationBrief {
            backstory: "The sun died.".to_string(),
            ..LocationBrief::default()
        };
        brief.exits.insert(Direction::North, "Hall: Wide.".to_string());
        brief.used_names.insert("Hall".to_string());

        let sketch = generator.create_location(&brief).await.unwrap();
        assert_eq!(sketch.name, "Crypt");

        let seen = generator.engine().seen.lock();
        let context = &seen[0];
        assert!(context.mentions("The sun died."));
        assert!(context.mentions("north: Hall: Wide."));
        assert!(context.mentions("\"Hall\""));
        assert!(context.mentions("JSON"));
    }

    #[tokio::test]
    async fn test_backstory_is_plain_text() {
        let generator = PromptedGenerator::new(EchoEngine::new("  Darkness fell.\n"));
        assert_eq!(generator.create_backstory().await.unwrap(), "Darkness fell.");
    }

    #[tokio::test]
    async fn test_render_forwards_size() {
        let generator = PromptedGenerator::new(EchoEngine::new(""));
        let image = generator
            .render_image("a sword", Some(ImageSize { width: 128, height: 128 }))
            .await
            .unwrap();
        assert_eq!(image.as_str(), "a sword@128x128");
    }
}

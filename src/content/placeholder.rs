//! Placeholder engine
//!
//! Offline [`ChatEngine`] for playing without any AI service: random words,
//! random sentences and scribbled PNGs.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{ImageEncoder, Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::engine::{ChatContext, ChatEngine};
use super::generator::{GenerationError, ImageSize};
use crate::dice::Dice;
use crate::items::ImageRef;

/// Side of the square scribble image, whatever size was asked for
pub const SCRIBBLE_SIZE: u32 = 512;
/// Black pixels per scribble
pub const SCRIBBLE_PIXELS: usize = 1000;

const ADJECTIVES: &[&str] = &[
    "ashen", "bleak", "crooked", "damp", "ebon", "forlorn", "gilded", "hollow", "iron", "jagged", "mossy",
    "pale", "rotten", "sunken", "twisted", "wailing",
];

const NOUNS: &[&str] = &[
    "altar", "bones", "cairn", "crypt", "dagger", "ember", "fen", "gate", "hound", "idol", "keep", "lantern",
    "mire", "relic", "shrine", "tomb", "vault", "wraith",
];

const VERBS: &[&str] = &[
    "broods", "crumbles", "drips", "echoes", "festers", "glimmers", "hums", "lingers", "rattles", "sleeps",
    "smoulders", "waits",
];

pub struct PlaceholderEngine {
    dice: Arc<Dice>,
}

impl PlaceholderEngine {
    pub fn new(dice: Arc<Dice>) -> Self {
        Self { dice }
    }

    fn word(&self) -> String {
        self.dice.roll(|rng| random_word(rng))
    }

    fn sentence(&self) -> String {
        self.dice.roll(|rng| random_sentence(rng))
    }
}

fn pick<R: Rng + ?Sized>(words: &[&'static str], rng: &mut R) -> &'static str {
    words.choose(rng).copied().unwrap_or_default()
}

fn random_word<R: Rng + ?Sized>(rng: &mut R) -> String {
    let word = if rng.gen_bool(0.5) { pick(ADJECTIVES, rng) } else { pick(NOUNS, rng) };
    word.to_string()
}

fn random_sentence<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = pick(ADJECTIVES, rng);
    let noun = pick(NOUNS, rng);
    let verb = pick(VERBS, rng);
    format!("The {adjective} {noun} {verb}.")
}

/// White square with random black pixels, as base64 PNG
pub fn scribble<R: Rng + ?Sized>(rng: &mut R) -> Result<String, GenerationError> {
    let mut image = RgbImage::from_pixel(SCRIBBLE_SIZE, SCRIBBLE_SIZE, Rgb([255, 255, 255]));
    for _ in 0..SCRIBBLE_PIXELS {
        let x = rng.gen_range(0..SCRIBBLE_SIZE);
        let y = rng.gen_range(0..SCRIBBLE_SIZE);
        image.put_pixel(x, y, Rgb([0, 0, 0]));
    }

    let mut buffer = Vec::new();
    image::codecs::png::PngEncoder::new(Cursor::new(&mut buffer))
        .write_image(image.as_raw(), image.width(), image.height(), image::ExtendedColorType::Rgb8)
        .map_err(|e| GenerationError::Request(e.to_string()))?;

    Ok(BASE64.encode(buffer))
}

#[async_trait]
impl ChatEngine for PlaceholderEngine {
    /// A `{"name", "description"}` object when the prompt asks for JSON,
    /// otherwise a plain sentence
    async fn complete(&self, context: &ChatContext) -> Result<String, GenerationError> {
        if context.mentions("JSON") {
            let reply = serde_json::json!({
                "name": self.word(),
                "description": self.sentence(),
            });
            Ok(reply.to_string())
        } else {
            Ok(self.sentence())
        }
    }

    async fn text_to_image(&self, _prompt: &str, _size: Option<ImageSize>) -> Result<ImageRef, GenerationError> {
        let seed = self.dice.roll(|rng| rng.gen::<u64>());
        let encoded = tokio::task::spawn_blocking(move || scribble(&mut StdRng::seed_from_u64(seed)))
            .await
            .map_err(|e| GenerationError::Request(e.to_string()))??;
        Ok(ImageRef::new(encoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::prompted::parse_sketch;

    fn engine() -> PlaceholderEngine {
        PlaceholderEngine::new(Arc::new(Dice::seeded(2)))
    }

    #[tokio::test]
    async fn test_json_when_asked() {
        let mut context = ChatContext::new();
        context.user("Answer in JSON please");
        let reply = engine().complete(&context).await.unwrap();
        let sketch = parse_sketch(&reply).unwrap();
        assert!(!sketch.name.is_empty());
        assert!(sketch.description.ends_with('.'));
    }

    #[tokio::test]
    async fn test_plain_sentence_otherwise() {
        let mut context = ChatContext::new();
        context.user("Tell me a story");
        let reply = engine().complete(&context).await.unwrap();
        assert!(reply.starts_with("The "));
        assert!(!reply.contains('{'));
    }

    #[test]
    fn test_scribble_is_png() {
        let encoded = scribble(&mut StdRng::seed_from_u64(4)).unwrap();
        let bytes = BASE64.decode(encoded).unwrap();
        let image = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png).unwrap();
        assert_eq!((image.width(), image.height()), (SCRIBBLE_SIZE, SCRIBBLE_SIZE));

        let black = image.to_rgb8().pixels().filter(|p| p.0 == [0, 0, 0]).count();
        assert!(black > 0 && black <= SCRIBBLE_PIXELS);
    }
}

//! Item type registry
//!
//! Turns generic item records into typed items and creates new items with
//! freshly rolled stats.

use std::sync::Arc;

use rand::Rng;
use serde_json::Value;

use super::item::{ImageRef, Item, ItemError, ItemKind, ItemRecord, ItemStats};
use super::rolls::{roll_kind, roll_stats};
use crate::content::{ContentGenerator, GenerationError, ITEM_IMAGE_SIZE};
use crate::dice::Dice;

/// Creates and reconstructs typed items
pub struct ItemRegistry {
    content: Arc<dyn ContentGenerator>,
    dice: Arc<Dice>,
}

impl ItemRegistry {
    pub fn new(content: Arc<dyn ContentGenerator>, dice: Arc<Dice>) -> Self {
        Self { content, dice }
    }

    /// Promote a generic record to its typed variant.
    ///
    /// Stored kind-specific fields are kept as they are; any field the record
    /// lacks is rolled fresh.
    pub fn typify(&self, record: ItemRecord) -> Result<Item, ItemError> {
        self.dice.roll(|rng| typify_with(record, rng))
    }

    /// A new item of `kind` with rolled stats
    pub fn generate(
        &self,
        kind: ItemKind,
        name: impl Into<String>,
        description: impl Into<String>,
        image: Option<ImageRef>,
    ) -> Item {
        let stats = self.dice.roll(|rng| roll_stats(kind, rng));
        let mut item = Item::new(name, description, stats);
        item.image = image;
        item
    }

    /// Ask the content generator for a new item of `kind`, with a portrait
    pub async fn create_item_of_type(&self, backstory: &str, kind: ItemKind) -> Result<Item, GenerationError> {
        let sketch = self.content.create_item_of_type(backstory, kind).await?;
        let image = self
            .content
            .render_image(&sketch.description, Some(ITEM_IMAGE_SIZE))
            .await?;

        let item = self.generate(kind, sketch.name, sketch.description, Some(image));
        log::debug!("Generated {} '{}'", kind, item.name);
        Ok(item)
    }

    /// New item of a uniformly random kind
    pub async fn create_item(&self, backstory: &str) -> Result<Item, GenerationError> {
        let kind = self.dice.roll(|rng| roll_kind(rng));
        self.create_item_of_type(backstory, kind).await
    }
}

/// Typify with an explicit RNG for the fields the record is missing
pub fn typify_with<R: Rng + ?Sized>(record: ItemRecord, rng: &mut R) -> Result<Item, ItemError> {
    let kind: ItemKind = record.item_type.parse()?;
    let invalid = |reason: String| ItemError::InvalidFields { kind, reason };

    // Rolled stats supply defaults, stored fields override them
    let mut fields = match serde_json::to_value(roll_stats(kind, rng)) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => return Err(invalid(format!("stats serialized as {other}"))),
        Err(e) => return Err(invalid(e.to_string())),
    };
    fields.extend(record.fields);
    fields.insert("item_type".to_string(), Value::String(kind.name().to_string()));

    let stats: ItemStats = serde_json::from_value(Value::Object(fields)).map_err(|e| invalid(e.to_string()))?;

    Ok(Item {
        name: record.name,
        description: record.description,
        image: record.image,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::ScriptedGenerator;
    use crate::items::{Damage, Weapon};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn registry() -> (Arc<ScriptedGenerator>, ItemRegistry) {
        let content = Arc::new(ScriptedGenerator::new());
        let registry = ItemRegistry::new(content.clone(), Arc::new(Dice::seeded(5)));
        (content, registry)
    }

    #[test]
    fn test_typify_keeps_stored_fields() {
        let record = ItemRecord::new("Weapon", "Ebony Sword", "Black and cold.")
            .with_field("damage", json!([3, 11, 2]))
            .with_field("required_strength", json!(4))
            .with_field("required_agility", json!(2))
            .with_field("required_intelligence", json!(1));

        let item = typify_with(record, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(item.name, "Ebony Sword");
        assert_eq!(
            item.as_weapon(),
            Some(&Weapon {
                damage: Damage::new(3, 11, 2),
                required_strength: 4,
                required_agility: 2,
                required_intelligence: 1,
            })
        );
    }

    #[test]
    fn test_typify_rolls_missing_fields() {
        let record = ItemRecord::new("armour", "tattered rags", "").with_field("defence", json!(7));
        let item = typify_with(record, &mut StdRng::seed_from_u64(0)).unwrap();

        let armour = item.as_armour().unwrap();
        assert_eq!(armour.defence, 7);
        assert!((1..=5).contains(&armour.required_strength));
        assert_eq!(item.kind(), ItemKind::Armour);
    }

    #[test]
    fn test_typify_unknown_type() {
        let (_, registry) = registry();
        let err = registry.typify(ItemRecord::new("Trinket", "bauble", "")).unwrap_err();
        assert_eq!(err, ItemError::UnknownItemType("Trinket".to_string()));
    }

    #[test]
    fn test_typify_bad_field_shape() {
        let record = ItemRecord::new("Money", "coin", "").with_field("amount", json!("lots"));
        let err = typify_with(record, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, ItemError::InvalidFields { kind: ItemKind::Money, .. }));
    }

    #[test]
    fn test_generate_rolls_kind_stats() {
        let (_, registry) = registry();
        let item = registry.generate(ItemKind::Money, "filthy copper piece", "grime", None);
        match item.stats {
            ItemStats::Money(money) => assert!((1..=100).contains(&money.amount)),
            other => panic!("expected money, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_item_of_type_uses_generator() {
        let (content, registry) = registry();
        let item = registry.create_item_of_type("lore", ItemKind::Weapon).await.unwrap();

        assert!(item.as_weapon().is_some());
        assert_eq!(item.name, "Weapon 0");
        assert_eq!(item.image, Some(ImageRef::new("image:A plain Weapon")));
        assert_eq!(content.item_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_item_propagates_failure() {
        let (content, registry) = registry();
        content.set_failing(true);
        let result = registry.create_item("lore").await;
        assert!(matches!(result, Err(GenerationError::Request(_))));
    }
}

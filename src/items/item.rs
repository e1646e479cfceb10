//! Item definitions
//!
//! The item kind tag, the generic record items are stored as, and the typed
//! item with one stats variant per kind.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Opaque reference to a rendered image (base64 PNG or URL).
///
/// Never interpreted, only persisted and forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Item kinds. The tag decides which stat fields an item carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    Weapon,
    Spellbook,
    Armour,
    Relic,
    Gem,
    Potion,
    Money,
}

impl ItemKind {
    /// Every kind that can spawn in a location
    pub const ALL: [ItemKind; 7] = [
        ItemKind::Weapon,
        ItemKind::Spellbook,
        ItemKind::Money,
        ItemKind::Gem,
        ItemKind::Armour,
        ItemKind::Relic,
        ItemKind::Potion,
    ];

    /// Canonical tag as written to save files
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Weapon => "Weapon",
            ItemKind::Spellbook => "Spellbook",
            ItemKind::Armour => "Armour",
            ItemKind::Relic => "Relic",
            ItemKind::Gem => "Gem",
            ItemKind::Potion => "Potion",
            ItemKind::Money => "Money",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ItemKind {
    type Err = ItemError;

    /// Tags are matched case-insensitively; older saves wrote "weapon".
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        ItemKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(tag.trim()))
            .ok_or_else(|| ItemError::UnknownItemType(tag.to_string()))
    }
}

/// Item errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("Unknown item type: {0}")]
    UnknownItemType(String),
    #[error("Invalid {kind} fields: {reason}")]
    InvalidFields { kind: ItemKind, reason: String },
}

/// Damage roll: uniform in `min..=max`, plus a flat bonus.
///
/// Stored as a `[min, max, bonus]` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(i32, i32, i32)", into = "(i32, i32, i32)")]
pub struct Damage {
    pub min: i32,
    pub max: i32,
    pub bonus: i32,
}

impl Damage {
    pub fn new(min: i32, max: i32, bonus: i32) -> Self {
        Self { min, max, bonus }
    }
}

impl From<(i32, i32, i32)> for Damage {
    fn from((min, max, bonus): (i32, i32, i32)) -> Self {
        Self { min, max, bonus }
    }
}

impl From<Damage> for (i32, i32, i32) {
    fn from(damage: Damage) -> Self {
        (damage.min, damage.max, damage.bonus)
    }
}

// ============================================================================
// Kind-specific stats
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub damage: Damage,
    pub required_strength: i32,
    pub required_agility: i32,
    pub required_intelligence: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spellbook {
    pub damage: Damage,
    pub required_intelligence: i32,
    pub required_constitution: i32,
    pub required_health: i32,
    pub required_mana: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Armour {
    pub defence: i32,
    pub required_strength: i32,
    pub required_intelligence: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relic {
    pub strength_bonus: i32,
    pub agility_bonus: i32,
    pub health_bonus: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gem {
    pub intelligence_bonus: i32,
    pub constitution_bonus: i32,
    pub mana_bonus: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Potion {
    pub health_bonus: i32,
    pub mana_healed: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: i32,
}

/// Stats for each kind, tagged by `item_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item_type")]
pub enum ItemStats {
    Weapon(Weapon),
    Spellbook(Spellbook),
    Armour(Armour),
    Relic(Relic),
    Gem(Gem),
    Potion(Potion),
    Money(Money),
}

impl ItemStats {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemStats::Weapon(_) => ItemKind::Weapon,
            ItemStats::Spellbook(_) => ItemKind::Spellbook,
            ItemStats::Armour(_) => ItemKind::Armour,
            ItemStats::Relic(_) => ItemKind::Relic,
            ItemStats::Gem(_) => ItemKind::Gem,
            ItemStats::Potion(_) => ItemKind::Potion,
            ItemStats::Money(_) => ItemKind::Money,
        }
    }
}

// ============================================================================
// Items
// ============================================================================

/// A typed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(flatten)]
    pub stats: ItemStats,
}

impl Item {
    pub fn new(name: impl Into<String>, description: impl Into<String>, stats: ItemStats) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            image: None,
            stats,
        }
    }

    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }

    pub fn kind(&self) -> ItemKind {
        self.stats.kind()
    }

    pub fn as_weapon(&self) -> Option<&Weapon> {
        match &self.stats {
            ItemStats::Weapon(weapon) => Some(weapon),
            _ => None,
        }
    }

    pub fn as_armour(&self) -> Option<&Armour> {
        match &self.stats {
            ItemStats::Armour(armour) => Some(armour),
            _ => None,
        }
    }

    /// Defence this item adds while carried (0 unless armour)
    pub fn defence(&self) -> i32 {
        self.as_armour().map_or(0, |a| a.defence)
    }
}

/// An item as read back from storage, before its kind is trusted.
///
/// Only the common fields are typed; kind-specific fields stay raw until
/// the registry promotes the record to an [`Item`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub item_type: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ItemRecord {
    /// A bare record carrying only the common fields
    pub fn new(item_type: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            name: name.into(),
            description: description.into(),
            image: None,
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_weapon() -> Item {
        Item::new(
            "rusty dagger",
            "More rust than iron.",
            ItemStats::Weapon(Weapon {
                damage: Damage::new(2, 9, 1),
                required_strength: 1,
                required_agility: 3,
                required_intelligence: 1,
            }),
        )
    }

    #[test]
    fn test_kind_parse_is_case_insensitive() {
        assert_eq!("Weapon".parse::<ItemKind>(), Ok(ItemKind::Weapon));
        assert_eq!("armour".parse::<ItemKind>(), Ok(ItemKind::Armour));
        assert_eq!(" SPELLBOOK ".parse::<ItemKind>(), Ok(ItemKind::Spellbook));
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(
            "Trinket".parse::<ItemKind>(),
            Err(ItemError::UnknownItemType("Trinket".to_string()))
        );
    }

    #[test]
    fn test_item_serializes_flat_with_tag() {
        let value = serde_json::to_value(test_weapon()).unwrap();
        assert_eq!(value["item_type"], json!("Weapon"));
        assert_eq!(value["name"], json!("rusty dagger"));
        assert_eq!(value["damage"], json!([2, 9, 1]));
        assert_eq!(value["required_agility"], json!(3));
        assert_eq!(value["image"], Value::Null);
    }

    #[test]
    fn test_record_keeps_unknown_fields() {
        let value = serde_json::to_value(test_weapon()).unwrap();
        let record: ItemRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.item_type, "Weapon");
        assert_eq!(record.fields["damage"], json!([2, 9, 1]));
        assert!(!record.fields.contains_key("name"));
    }

    #[test]
    fn test_defence_only_for_armour() {
        let armour = Item::new(
            "tattered rags",
            "",
            ItemStats::Armour(Armour { defence: 4, required_strength: 1, required_intelligence: 1 }),
        );
        assert_eq!(armour.defence(), 4);
        assert_eq!(test_weapon().defence(), 0);
        assert!(test_weapon().as_weapon().is_some());
    }
}

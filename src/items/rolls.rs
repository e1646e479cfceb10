//! Stat rolls
//!
//! Random stat generation for items and combatants. Every roller takes the
//! RNG explicitly so tests can drive it with a seeded generator.

use rand::Rng;

use super::item::{Armour, Damage, Gem, ItemKind, ItemStats, Money, Potion, Relic, Spellbook, Weapon};

/// Bonus outcomes with their relative weights (0 is five times as likely as 1)
pub const BONUS_TABLE: [i32; 9] = [0, 0, 0, 0, 0, 1, 1, 2, 3];

/// Ability score for a generated combatant: 1-20
pub fn roll_ability<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(1..=20)
}

/// Starting level for a generated combatant: 1-10
pub fn roll_level<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(1..=10)
}

/// Stat requirement: d10 - 5, floored at 1 (so 1-5, weighted to 1)
pub fn roll_requirement<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    (rng.gen_range(1..=10) - 5).max(1)
}

/// Weighted bonus from [`BONUS_TABLE`]
pub fn roll_bonus<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    BONUS_TABLE[rng.gen_range(0..BONUS_TABLE.len())]
}

/// Damage triple: 1-6 minimum, 7-12 maximum, weighted bonus
pub fn roll_damage<R: Rng + ?Sized>(rng: &mut R) -> Damage {
    let min = rng.gen_range(1..=6);
    let max = rng.gen_range(7..=12);
    Damage::new(min, max, roll_bonus(rng))
}

/// Armour defence: 1-10
pub fn roll_defence<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(1..=10)
}

/// Coin amount: 1-100
pub fn roll_amount<R: Rng + ?Sized>(rng: &mut R) -> i32 {
    rng.gen_range(1..=100)
}

/// Roll a full set of stats for an item kind
pub fn roll_stats<R: Rng + ?Sized>(kind: ItemKind, rng: &mut R) -> ItemStats {
    match kind {
        ItemKind::Weapon => ItemStats::Weapon(Weapon {
            damage: roll_damage(rng),
            required_strength: roll_requirement(rng),
            required_agility: roll_requirement(rng),
            required_intelligence: roll_requirement(rng),
        }),
        ItemKind::Spellbook => ItemStats::Spellbook(Spellbook {
            damage: roll_damage(rng),
            required_intelligence: roll_requirement(rng),
            required_constitution: roll_requirement(rng),
            required_health: roll_requirement(rng),
            required_mana: roll_requirement(rng),
        }),
        ItemKind::Armour => ItemStats::Armour(Armour {
            defence: roll_defence(rng),
            required_strength: roll_requirement(rng),
            required_intelligence: roll_requirement(rng),
        }),
        ItemKind::Relic => ItemStats::Relic(Relic {
            strength_bonus: roll_bonus(rng),
            agility_bonus: roll_bonus(rng),
            health_bonus: roll_bonus(rng),
        }),
        ItemKind::Gem => ItemStats::Gem(Gem {
            intelligence_bonus: roll_bonus(rng),
            constitution_bonus: roll_bonus(rng),
            mana_bonus: roll_bonus(rng),
        }),
        ItemKind::Potion => ItemStats::Potion(Potion {
            health_bonus: roll_bonus(rng),
            mana_healed: roll_bonus(rng),
        }),
        ItemKind::Money => ItemStats::Money(Money {
            amount: roll_amount(rng),
        }),
    }
}

/// Pick a kind uniformly from [`ItemKind::ALL`]
pub fn roll_kind<R: Rng + ?Sized>(rng: &mut R) -> ItemKind {
    ItemKind::ALL[rng.gen_range(0..ItemKind::ALL.len())]
}

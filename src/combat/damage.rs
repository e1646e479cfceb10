//! Damage calculation
//!
//! Attack resolution shared by the player and enemies. Damage is applied as
//! a fraction of the defender's own max health and is never clamped here;
//! `health <= 0` means defeat.

use rand::Rng;

use super::combatant::Combatant;
use crate::items::Weapon;

/// Result of a single attack
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackResult {
    /// Agility difference plus a d20-style roll
    pub to_hit: i32,
    /// Damage before scaling by max health (0 on a miss)
    pub raw_damage: i32,
    /// Fraction subtracted from the defender's health
    pub damage_fraction: f64,
    /// Whether the attack missed
    pub is_miss: bool,
}

impl AttackResult {
    pub fn missed(to_hit: i32) -> Self {
        Self {
            to_hit,
            raw_damage: 0,
            damage_fraction: 0.0,
            is_miss: true,
        }
    }

    pub fn message(&self) -> String {
        if self.is_miss {
            "missed".to_string()
        } else {
            format!("hit for {} ({:.0}% of max health)", self.raw_damage, self.damage_fraction * 100.0)
        }
    }
}

/// Attack `defender` with `weapon`, mutating its health in place
pub fn attack<R: Rng + ?Sized>(
    attacker: &Combatant,
    defender: &mut Combatant,
    weapon: &Weapon,
    rng: &mut R,
) -> AttackResult {
    let to_hit = attacker.agility - defender.agility + rng.gen_range(0..=20);
    if to_hit <= 0 {
        return AttackResult::missed(to_hit);
    }

    let damage = weapon.damage;
    let (low, high) = (damage.min.min(damage.max), damage.min.max(damage.max));
    let roll = rng.gen_range(low..=high);
    let raw_damage = roll + damage.bonus + attacker.strength - defender.armour_defence();

    let damage_fraction = apply_damage(defender, raw_damage);
    AttackResult {
        to_hit,
        raw_damage,
        damage_fraction,
        is_miss: false,
    }
}

/// Subtract `raw_damage / max_health` from the defender's health fraction.
///
/// Negative raw damage (armour beyond the hit) heals. A non-positive max
/// health is treated as 1.
pub fn apply_damage(defender: &mut Combatant, raw_damage: i32) -> f64 {
    let max_health = defender.max_health().max(1);
    let fraction = raw_damage as f64 / max_health as f64;
    defender.health -= fraction;
    fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{Armour, Damage, Item, ItemStats};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn club() -> Weapon {
        Weapon {
            damage: Damage::new(2, 2, 0),
            required_strength: 1,
            required_agility: 1,
            required_intelligence: 1,
        }
    }

    #[test]
    fn test_fractional_damage() {
        let mut defender = Combatant::new(1, 1, 1, 5, 2);
        let fraction = apply_damage(&mut defender, 4);
        assert_eq!(fraction, 0.4);
        assert!((defender.health - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_health_can_go_negative() {
        let mut defender = Combatant::new(1, 1, 1, 1, 1);
        apply_damage(&mut defender, 3);
        assert_eq!(defender.health, -2.0);
        assert!(defender.is_defeated());
    }

    #[test]
    fn test_miss_leaves_health_unchanged() {
        let attacker = Combatant::new(10, 1, 1, 10, 1);
        let mut defender = Combatant::new(1, 40, 1, 10, 1);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let result = attack(&attacker, &mut defender, &club(), &mut rng);
            assert!(result.is_miss);
            assert!(result.to_hit <= 0);
        }
        assert_eq!(defender.health, 1.0);
    }

    #[test]
    fn test_hit_subtracts_armour() {
        // to_hit is at least 39, so every swing lands
        let attacker = Combatant::new(3, 40, 1, 10, 1);
        let mut defender = Combatant::new(1, 1, 1, 5, 2);
        defender.items.push(Item::new(
            "plate",
            "",
            ItemStats::Armour(Armour { defence: 1, required_strength: 1, required_intelligence: 1 }),
        ));

        let result = attack(&attacker, &mut defender, &club(), &mut StdRng::seed_from_u64(9));
        assert!(!result.is_miss);
        // 2 (roll) + 0 (bonus) + 3 (strength) - 1 (armour)
        assert_eq!(result.raw_damage, 4);
        assert!((defender.health - 0.6).abs() < 1e-12);
    }
}

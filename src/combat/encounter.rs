//! Combat coordinator
//!
//! Owns the single enemy slot: rolls encounters after moves, resolves attack
//! turns and resets the world when the player dies.
//!
//! States: no encounter, enemy present, then victory or defeat, which both
//! return to no encounter. Defeat replaces the whole world.

use std::sync::Arc;

use super::combatant::{Combatant, Enemy};
use super::damage::{attack, AttackResult};
use crate::content::{ContentGenerator, GenerationError, ITEM_IMAGE_SIZE};
use crate::dice::Dice;
use crate::items::{ItemKind, ItemRegistry};
use crate::world::{SharedWorld, WorldFactory};

/// Chance of an encounter after each successful move
pub const DEFAULT_ENCOUNTER_CHANCE: f64 = 0.1;

/// How an attack command resolved
#[derive(Debug, Clone, PartialEq)]
pub enum AttackOutcome {
    /// Nobody to attack
    NoEnemy,
    /// The player carries no weapon; no turn was taken
    NoPlayerWeapon,
    /// The enemy fell
    Victory { enemy: String, blow: AttackResult },
    /// The enemy survived but has nothing to strike back with
    NoEnemyWeapon { enemy: String, blow: AttackResult },
    /// Both sides struck
    Exchanged {
        enemy: String,
        blow: AttackResult,
        counter: AttackResult,
    },
    /// The player fell. `fresh_world` is false when the replacement world
    /// could not be generated yet.
    Defeat {
        enemy: String,
        blow: AttackResult,
        counter: AttackResult,
        fresh_world: bool,
    },
}

impl AttackOutcome {
    /// Whether the command used up the player's turn
    pub fn took_turn(&self) -> bool {
        !matches!(self, AttackOutcome::NoEnemy | AttackOutcome::NoPlayerWeapon)
    }
}

pub struct CombatCoordinator {
    content: Arc<dyn ContentGenerator>,
    items: Arc<ItemRegistry>,
    factory: Arc<WorldFactory>,
    dice: Arc<Dice>,
    encounter_chance: f64,
}

impl CombatCoordinator {
    pub fn new(
        content: Arc<dyn ContentGenerator>,
        items: Arc<ItemRegistry>,
        factory: Arc<WorldFactory>,
        dice: Arc<Dice>,
    ) -> Self {
        Self {
            content,
            items,
            factory,
            dice,
            encounter_chance: DEFAULT_ENCOUNTER_CHANCE,
        }
    }

    pub fn with_encounter_chance(mut self, chance: f64) -> Self {
        self.encounter_chance = chance;
        self
    }

    /// A new enemy with rolled stats, a portrait and one weapon
    pub async fn spawn_enemy(&self, backstory: &str, surroundings: &str) -> Result<Enemy, GenerationError> {
        let sketch = self.content.create_enemy(backstory, surroundings).await?;
        let image = self
            .content
            .render_image(&sketch.description, Some(ITEM_IMAGE_SIZE))
            .await?;

        let mut combatant = self.dice.roll(|rng| Combatant::roll(rng));
        let weapon = self.items.create_item_of_type(backstory, ItemKind::Weapon).await?;
        combatant.items.push(weapon);

        Ok(Enemy {
            combatant,
            name: sketch.name,
            description: sketch.description,
            image: Some(image),
        })
    }

    /// Roll for an encounter at the player's location.
    ///
    /// Returns the new enemy, or `None` when the roll failed or an enemy is
    /// already present.
    pub async fn roll_encounter(&self, world: &SharedWorld) -> Result<Option<Enemy>, GenerationError> {
        let (epoch, backstory, surroundings) = {
            let current = world.read();
            if current.has_enemy() {
                return Ok(None);
            }
            let here = current.player_location();
            (world.epoch(), current.backstory.clone(), here.description.clone())
        };

        if !self.dice.chance(self.encounter_chance) {
            return Ok(None);
        }

        let enemy = self.spawn_enemy(&backstory, &surroundings).await?;

        let mut current = world.write();
        if world.epoch() != epoch {
            return Err(GenerationError::Superseded);
        }
        if current.has_enemy() {
            return Ok(None);
        }
        log::info!("Encountered {} at {}", enemy.name, current.player.position());
        current.enemy = Some(enemy.clone());
        Ok(Some(enemy))
    }

    /// Resolve one attack turn
    pub async fn attack(&self, world: &SharedWorld) -> Result<AttackOutcome, GenerationError> {
        match self.exchange_blows(world) {
            AttackOutcome::Defeat {
                enemy,
                blow,
                counter,
                ..
            } => {
                log::info!("The player was slain by {}", enemy);
                let fresh_world = match self.reset_world(world).await {
                    Ok(()) => true,
                    Err(e) => {
                        log::warn!("Could not generate a new world after defeat: {}", e);
                        false
                    }
                };
                Ok(AttackOutcome::Defeat {
                    enemy,
                    blow,
                    counter,
                    fresh_world,
                })
            }
            outcome => Ok(outcome),
        }
    }

    /// Synchronous part of a turn, under the world lock
    fn exchange_blows(&self, world: &SharedWorld) -> AttackOutcome {
        let mut guard = world.write();
        let current = &mut *guard;

        let Some(enemy) = current.enemy.as_mut() else {
            return AttackOutcome::NoEnemy;
        };
        let Some(weapon) = current.player.combatant.weapon().copied() else {
            return AttackOutcome::NoPlayerWeapon;
        };

        let blow = self
            .dice
            .roll(|rng| attack(&current.player.combatant, &mut enemy.combatant, &weapon, rng));
        log::info!("Player attacks {}: {}", enemy.name, blow.message());

        if enemy.combatant.is_defeated() {
            let name = enemy.name.clone();
            current.enemy = None;
            log::info!("{} was defeated", name);
            return AttackOutcome::Victory { enemy: name, blow };
        }

        let name = enemy.name.clone();
        let Some(enemy_weapon) = enemy.combatant.weapon().copied() else {
            return AttackOutcome::NoEnemyWeapon { enemy: name, blow };
        };

        let counter = self
            .dice
            .roll(|rng| attack(&enemy.combatant, &mut current.player.combatant, &enemy_weapon, rng));
        log::info!("{} attacks the player: {}", name, counter.message());

        if current.player.combatant.is_defeated() {
            current.enemy = None;
            return AttackOutcome::Defeat {
                enemy: name,
                blow,
                counter,
                fresh_world: false,
            };
        }
        AttackOutcome::Exchanged {
            enemy: name,
            blow,
            counter,
        }
    }

    /// Discard the current world for a brand-new one
    pub async fn reset_world(&self, world: &SharedWorld) -> Result<(), GenerationError> {
        let fresh = self.factory.create_world().await?;
        world.replace(fresh);
        log::info!("World reset");
        Ok(())
    }
}

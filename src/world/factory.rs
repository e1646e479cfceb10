//! World creation
//!
//! A new world is a fresh backstory plus a freshly rolled player carrying
//! one generated weapon. Nothing is charted and there is no enemy.

use std::sync::Arc;

use super::grid::World;
use crate::combat::{Combatant, Player};
use crate::content::{ContentGenerator, GenerationError};
use crate::dice::Dice;
use crate::items::{ItemKind, ItemRegistry};

pub struct WorldFactory {
    content: Arc<dyn ContentGenerator>,
    items: Arc<ItemRegistry>,
    dice: Arc<Dice>,
}

impl WorldFactory {
    pub fn new(content: Arc<dyn ContentGenerator>, items: Arc<ItemRegistry>, dice: Arc<Dice>) -> Self {
        Self { content, items, dice }
    }

    pub async fn create_world(&self) -> Result<World, GenerationError> {
        let backstory = self.content.create_backstory().await?;
        let player = self.create_player(&backstory).await?;
        log::info!("Created a new world");
        Ok(World::new(backstory, player))
    }

    /// Random stats at the origin, armed with one weapon
    pub async fn create_player(&self, backstory: &str) -> Result<Player, GenerationError> {
        let mut combatant = self.dice.roll(|rng| Combatant::roll(rng));
        let weapon = self.items.create_item_of_type(backstory, ItemKind::Weapon).await?;
        combatant.items.push(weapon);
        Ok(Player::new(combatant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::testing::ScriptedGenerator;
    use crate::world::Position;

    fn factory(content: Arc<ScriptedGenerator>) -> WorldFactory {
        let dice = Arc::new(Dice::seeded(11));
        let items = Arc::new(ItemRegistry::new(content.clone(), dice.clone()));
        WorldFactory::new(content, items, dice)
    }

    #[tokio::test]
    async fn test_create_world() {
        let content = Arc::new(ScriptedGenerator::new());
        let world = factory(content).create_world().await.unwrap();

        assert_eq!(world.backstory, "Backstory #0");
        assert!(world.locations.is_empty());
        assert!(world.enemy.is_none());
        assert_eq!(world.player.position(), Position::default());
        assert_eq!(world.player.combatant.items.len(), 1);
        assert!(world.player.combatant.weapon().is_some());
        assert_eq!(world.player.combatant.health, 1.0);
    }

    #[tokio::test]
    async fn test_create_world_failure() {
        let content = Arc::new(ScriptedGenerator::new());
        content.set_failing(true);
        assert!(factory(content).create_world().await.is_err());
    }
}

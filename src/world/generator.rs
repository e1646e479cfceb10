//! Location generator
//!
//! The only path by which a coordinate goes from uncharted to charted.
//!
//! Content calls are slow, so they run without holding the world lock. A
//! per-coordinate async lock makes sure at most one generation is in flight
//! for any coordinate; a second caller waits on it and then finds the
//! location already charted. If the world is replaced while a generation is
//! running, the result is discarded.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::location::Location;
use super::position::Position;
use super::shared::SharedWorld;
use crate::content::{ContentGenerator, GenerationError, LocationBrief, Sketch};
use crate::dice::Dice;
use crate::items::ItemRegistry;

/// Chance that a new location holds an item
pub const DEFAULT_ITEM_CHANCE: f64 = 0.5;
/// How often a colliding location name is re-requested
pub const DEFAULT_NAME_ATTEMPTS: u32 = 3;

type CoordinateLock = Arc<tokio::sync::Mutex<()>>;

/// A caller's hold on a coordinate lock. Dropping it (also when the
/// generating future is cancelled) removes the map entry once no one else
/// holds the lock.
struct Claim<'a> {
    pending: &'a Mutex<HashMap<Position, CoordinateLock>>,
    position: Position,
    slot: CoordinateLock,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        let mut pending = self.pending.lock();
        // Ours and the map's
        if pending
            .get(&self.position)
            .is_some_and(|lock| Arc::strong_count(lock) == 2)
        {
            pending.remove(&self.position);
        }
    }
}

pub struct LocationGenerator {
    content: Arc<dyn ContentGenerator>,
    items: Arc<ItemRegistry>,
    dice: Arc<Dice>,
    item_chance: f64,
    name_attempts: u32,
    pending: Mutex<HashMap<Position, CoordinateLock>>,
}

impl LocationGenerator {
    pub fn new(content: Arc<dyn ContentGenerator>, items: Arc<ItemRegistry>, dice: Arc<Dice>) -> Self {
        Self {
            content,
            items,
            dice,
            item_chance: DEFAULT_ITEM_CHANCE,
            name_attempts: DEFAULT_NAME_ATTEMPTS,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_item_chance(mut self, chance: f64) -> Self {
        self.item_chance = chance;
        self
    }

    pub fn with_name_attempts(mut self, attempts: u32) -> Self {
        self.name_attempts = attempts.max(1);
        self
    }

    /// Charted location at `position`, generating and storing it first if needed
    pub async fn get_or_create(&self, world: &SharedWorld, position: Position) -> Result<Location, GenerationError> {
        let charted = world.read().charted(position).cloned();
        if let Some(location) = charted {
            return Ok(location);
        }

        let claim = self.acquire(position);
        let _guard = claim.slot.lock().await;
        self.fill(world, position).await
    }

    /// Coordinates with a generation currently queued or running
    pub fn in_flight(&self) -> usize {
        self.pending.lock().len()
    }

    fn acquire(&self, position: Position) -> Claim<'_> {
        let slot = self.pending.lock().entry(position).or_default().clone();
        Claim {
            pending: &self.pending,
            position,
            slot,
        }
    }

    /// Generate under the coordinate lock
    async fn fill(&self, world: &SharedWorld, position: Position) -> Result<Location, GenerationError> {
        let (epoch, brief) = {
            let current = world.read();
            if let Some(location) = current.charted(position) {
                return Ok(location.clone());
            }
            let brief = LocationBrief {
                backstory: current.backstory.clone(),
                exits: current.exit_summaries(position, true),
                used_names: current.used_names(),
            };
            (world.epoch(), brief)
        };

        let sketch = self.unique_sketch(&brief).await?;
        let image = self.content.render_image(&sketch.description, None).await?;
        let mut location = Location::new(sketch.name, sketch.description, Some(image));

        if self.dice.chance(self.item_chance) {
            let item = self.items.create_item(&brief.backstory).await?;
            log::info!("Spawned {} '{}' at {}", item.kind(), item.name, position);
            location.items.push(item);
        }

        let mut current = world.write();
        if world.epoch() != epoch {
            log::warn!("Discarding location for {}: world was replaced", position);
            return Err(GenerationError::Superseded);
        }
        // Another coordinate may have claimed the name while we were generating
        if current.used_names().contains(&location.name) {
            log::warn!("Location name '{}' was taken during generation", location.name);
            return Err(GenerationError::DuplicateName(location.name));
        }

        log::info!("Charted {} at {}", location.name, position);
        current.chart(position, location.clone());
        Ok(location)
    }

    async fn unique_sketch(&self, brief: &LocationBrief) -> Result<Sketch, GenerationError> {
        let mut last = String::new();
        for attempt in 1..=self.name_attempts.max(1) {
            let sketch = self.content.create_location(brief).await?;
            if !brief.used_names.contains(&sketch.name) {
                return Ok(sketch);
            }
            log::warn!(
                "Generated location name '{}' is already used (attempt {}/{})",
                sketch.name,
                attempt,
                self.name_attempts
            );
            last = sketch.name;
        }
        Err(GenerationError::DuplicateName(last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::{Combatant, Player};
    use crate::content::testing::ScriptedGenerator;
    use crate::world::World;
    use std::time::Duration;

    fn generator(content: Arc<ScriptedGenerator>, item_chance: f64) -> LocationGenerator {
        let dice = Arc::new(Dice::seeded(1));
        let items = Arc::new(ItemRegistry::new(content.clone(), dice.clone()));
        LocationGenerator::new(content, items, dice).with_item_chance(item_chance)
    }

    fn shared_world() -> SharedWorld {
        SharedWorld::new(World::new("Once.", Player::new(Combatant::new(5, 5, 5, 5, 1))))
    }

    #[tokio::test]
    async fn test_generates_once_then_reuses() {
        let content = Arc::new(ScriptedGenerator::new());
        let generator = generator(content.clone(), 0.0);
        let world = shared_world();
        let origin = Position::default();

        let first = generator.get_or_create(&world, origin).await.unwrap();
        let second = generator.get_or_create(&world, origin).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.name, "Place 0");
        assert_eq!(first.image.as_ref().map(|i| i.as_str()), Some("image:Description of place 0"));
        assert_eq!(content.locations(), 1);
        assert_eq!(world.read().locations.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_visits_generate_once() {
        let content = Arc::new(ScriptedGenerator::with_delay(Duration::from_millis(20)));
        let generator = generator(content.clone(), 0.0);
        let world = shared_world();
        let target = Position::new(4, -2);

        let (a, b) = tokio::join!(
            generator.get_or_create(&world, target),
            generator.get_or_create(&world, target)
        );

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(content.locations(), 1);
        assert_eq!(world.read().locations.len(), 1);
        assert_eq!(generator.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_different_coordinates_do_not_block() {
        let content = Arc::new(ScriptedGenerator::with_delay(Duration::from_millis(5)));
        let generator = generator(content.clone(), 0.0);
        let world = shared_world();

        let (a, b) = tokio::join!(
            generator.get_or_create(&world, Position::new(0, 1)),
            generator.get_or_create(&world, Position::new(0, -1))
        );
        assert_ne!(a.unwrap().name, b.unwrap().name);
        assert_eq!(world.read().locations.len(), 2);
    }

    #[tokio::test]
    async fn test_item_spawn_chance() {
        let content = Arc::new(ScriptedGenerator::new());
        let always = generator(content.clone(), 1.0);
        let world = shared_world();
        let location = always.get_or_create(&world, Position::new(1, 0)).await.unwrap();
        assert_eq!(location.items.len(), 1);

        let never = generator(content, 0.0);
        let location = never.get_or_create(&world, Position::new(2, 0)).await.unwrap();
        assert!(location.items.is_empty());
    }

    #[tokio::test]
    async fn test_name_collision_retries() {
        let content = Arc::new(ScriptedGenerator::with_location_names(&["Hall", "Hall", "Crypt"]));
        let generator = generator(content.clone(), 0.0);
        let world = shared_world();
        world.write().chart(Position::new(9, 9), Location::new("Hall", "Taken.", None));

        let location = generator.get_or_create(&world, Position::default()).await.unwrap();
        assert_eq!(location.name, "Crypt");
        assert_eq!(content.locations(), 3);
    }

    #[tokio::test]
    async fn test_name_collision_gives_up() {
        let content = Arc::new(ScriptedGenerator::with_location_names(&["Hall", "Hall"]));
        let generator = generator(content, 0.0).with_name_attempts(2);
        let world = shared_world();
        world.write().chart(Position::new(9, 9), Location::new("Hall", "Taken.", None));

        let result = generator.get_or_create(&world, Position::default()).await;
        assert_eq!(result, Err(GenerationError::DuplicateName("Hall".to_string())));
        assert!(!world.read().is_charted(Position::default()));
    }

    #[tokio::test]
    async fn test_failure_leaves_world_untouched() {
        let content = Arc::new(ScriptedGenerator::new());
        content.set_failing(true);
        let generator = generator(content, 1.0);
        let world = shared_world();

        assert!(generator.get_or_create(&world, Position::default()).await.is_err());
        assert!(world.read().locations.is_empty());
        assert_eq!(generator.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_generation_frees_coordinate() {
        let content = Arc::new(ScriptedGenerator::with_delay(Duration::from_millis(200)));
        let generator = generator(content, 0.0);
        let world = shared_world();
        let target = Position::new(2, 2);

        let cut_short =
            tokio::time::timeout(Duration::from_millis(20), generator.get_or_create(&world, target)).await;
        assert!(cut_short.is_err());
        assert_eq!(generator.in_flight(), 0);
        assert!(!world.read().is_charted(target));

        // Nothing left locked: the coordinate generates normally
        assert!(generator.get_or_create(&world, target).await.is_ok());
        assert_eq!(generator.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_replaced_world_discards_result() {
        let content = Arc::new(ScriptedGenerator::with_delay(Duration::from_millis(30)));
        let generator = generator(content, 0.0);
        let world = shared_world();

        let (result, _) = tokio::join!(generator.get_or_create(&world, Position::default()), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            world.replace(World::new("Anew.", Player::new(Combatant::new(1, 1, 1, 1, 1))));
        });

        assert_eq!(result, Err(GenerationError::Superseded));
        assert!(world.read().locations.is_empty());
    }
}

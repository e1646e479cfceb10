//! Game session
//!
//! The command facade over one world: movement, combat, item transfer and
//! inspection. Mutating commands run one at a time; each reports which
//! commands are available afterwards.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use super::config::{read_token, ConfigError, EngineConfig, GameConfig};
use crate::combat::{AttackOutcome, CombatCoordinator, Enemy, TransferOutcome};
use crate::content::{
    ContentGenerator, Deadline, GenerationError, OpenAiEngine, PlaceholderEngine, PromptedGenerator,
};
use crate::dice::Dice;
use crate::items::{Item, ItemRegistry};
use crate::save::{load_or_create, save_world, JsonFileStore, StoreError, WorldStore};
use crate::world::{Direction, Location, LocationGenerator, Position, SharedWorld, World, WorldFactory};

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Which commands make sense right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStates {
    /// No enemy blocks the way
    pub movement: bool,
    /// An enemy is present
    pub combat: bool,
    /// The player carries something
    pub inventory: bool,
    /// Something lies at the player's location
    pub local_items: bool,
}

impl CommandStates {
    pub fn of(world: &World) -> Self {
        Self {
            movement: !world.has_enemy(),
            combat: world.has_enemy(),
            inventory: !world.player.combatant.items.is_empty(),
            local_items: !world.player_location().items.is_empty(),
        }
    }
}

/// A command's result plus the command states after it
#[derive(Debug, Clone, PartialEq)]
pub struct ActionReport<T> {
    pub outcome: T,
    pub commands: CommandStates,
}

/// How a move command resolved
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The player stepped into `location`, possibly meeting an enemy there
    Moved {
        to: Position,
        location: Location,
        encounter: Option<Enemy>,
    },
    /// An enemy bars the way
    Blocked { enemy: String },
}

pub struct Game {
    world: SharedWorld,
    store: Arc<dyn WorldStore>,
    locations: LocationGenerator,
    combat: CombatCoordinator,
    autosave: bool,
    turn: tokio::sync::Mutex<()>,
}

impl Game {
    /// Wire a session around an existing world
    pub fn new(
        world: World,
        store: Arc<dyn WorldStore>,
        content: Arc<dyn ContentGenerator>,
        dice: Arc<Dice>,
        config: &GameConfig,
    ) -> Self {
        let (items, factory) = Self::builders(&content, &dice);
        Self::assemble(world, store, content, items, factory, dice, config)
    }

    /// Build everything from configuration and load (or create) the world
    pub async fn bootstrap(config: &GameConfig) -> Result<Self, GameError> {
        let dice = Arc::new(Dice::from_seed(config.seed));
        let content = build_content(config, dice.clone()).await?;
        let save_path = config.save_path();
        log::info!("Using save file {}", save_path.display());
        let store: Arc<dyn WorldStore> = Arc::new(JsonFileStore::new(save_path));

        let (items, factory) = Self::builders(&content, &dice);
        let world = load_or_create(store.as_ref(), &items, &factory).await?;
        Ok(Self::assemble(world, store, content, items, factory, dice, config))
    }

    fn builders(content: &Arc<dyn ContentGenerator>, dice: &Arc<Dice>) -> (Arc<ItemRegistry>, Arc<WorldFactory>) {
        let items = Arc::new(ItemRegistry::new(content.clone(), dice.clone()));
        let factory = Arc::new(WorldFactory::new(content.clone(), items.clone(), dice.clone()));
        (items, factory)
    }

    fn assemble(
        world: World,
        store: Arc<dyn WorldStore>,
        content: Arc<dyn ContentGenerator>,
        items: Arc<ItemRegistry>,
        factory: Arc<WorldFactory>,
        dice: Arc<Dice>,
        config: &GameConfig,
    ) -> Self {
        let locations = LocationGenerator::new(content.clone(), items.clone(), dice.clone())
            .with_item_chance(config.item_chance)
            .with_name_attempts(config.name_attempts);
        let combat =
            CombatCoordinator::new(content, items, factory, dice).with_encounter_chance(config.encounter_chance);

        Self {
            world: SharedWorld::new(world),
            store,
            locations,
            combat,
            autosave: config.autosave,
            turn: tokio::sync::Mutex::new(()),
        }
    }

    pub fn world(&self) -> &SharedWorld {
        &self.world
    }

    // ========================================================================
    // Mutating commands
    // ========================================================================

    /// Step one square. Rejected while an enemy is present.
    ///
    /// The target location is generated before the player moves; if that
    /// fails the player stays put.
    pub async fn move_player(&self, direction: Direction) -> Result<ActionReport<MoveOutcome>, GameError> {
        let _turn = self.turn.lock().await;
        self.ensure_alive().await?;

        let (from, blocker) = {
            let world = self.world.read();
            (world.player.position(), world.enemy.as_ref().map(|e| e.name.clone()))
        };
        if let Some(enemy) = blocker {
            log::debug!("Movement blocked by {}", enemy);
            return Ok(self.report(MoveOutcome::Blocked { enemy }));
        }

        let to = from.step(direction);
        let location = self.locations.get_or_create(&self.world, to).await?;
        self.world.write().player.step(direction);
        log::info!("Moved {} to {} ({})", direction, to, location.name);

        let encounter = match self.combat.roll_encounter(&self.world).await {
            Ok(encounter) => encounter,
            Err(e) => {
                log::warn!("Enemy generation failed: {}", e);
                None
            }
        };

        self.autosave().await;
        Ok(self.report(MoveOutcome::Moved {
            to,
            location,
            encounter,
        }))
    }

    pub async fn attack(&self) -> Result<ActionReport<AttackOutcome>, GameError> {
        let _turn = self.turn.lock().await;
        self.ensure_alive().await?;

        let outcome = self.combat.attack(&self.world).await?;
        if outcome.took_turn() {
            self.autosave().await;
        }
        Ok(self.report(outcome))
    }

    /// Pick up an item at the player's location by exact name
    pub async fn take(&self, name: &str) -> Result<ActionReport<TransferOutcome>, GameError> {
        let _turn = self.turn.lock().await;
        self.ensure_alive().await?;
        self.here().await?;

        let outcome = {
            let mut guard = self.world.write();
            let world = &mut *guard;
            let position = world.player.position();
            match world.locations.get_mut(&position) {
                Some(location) => world.player.take_item(name, location),
                None => TransferOutcome::NotFound(name.to_string()),
            }
        };

        if outcome.is_moved() {
            self.autosave().await;
        }
        Ok(self.report(outcome))
    }

    /// Leave a carried item at the player's location
    pub async fn drop(&self, name: &str) -> Result<ActionReport<TransferOutcome>, GameError> {
        let _turn = self.turn.lock().await;
        self.ensure_alive().await?;
        self.here().await?;

        let outcome = {
            let mut guard = self.world.write();
            let world = &mut *guard;
            let position = world.player.position();
            match world.locations.get_mut(&position) {
                Some(location) => world.player.drop_item(name, location),
                None => TransferOutcome::NotFound(name.to_string()),
            }
        };

        if outcome.is_moved() {
            self.autosave().await;
        }
        Ok(self.report(outcome))
    }

    pub async fn save(&self) -> Result<(), GameError> {
        let snapshot = self.world.snapshot();
        save_world(self.store.as_ref(), &snapshot).await?;
        Ok(())
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn backstory(&self) -> String {
        self.world.read().backstory.clone()
    }

    pub fn position(&self) -> Position {
        self.world.read().player.position()
    }

    /// The player's location, generated first if the player stands on
    /// uncharted ground (a fresh world)
    pub async fn location(&self) -> Result<ActionReport<Location>, GameError> {
        let location = self.here().await?;
        Ok(self.report(location))
    }

    pub fn local_items(&self) -> ActionReport<Vec<Item>> {
        let items = self.world.read().player_location().items.clone();
        self.report(items)
    }

    pub fn inventory(&self) -> ActionReport<Vec<Item>> {
        let items = self.world.read().player.combatant.items.clone();
        self.report(items)
    }

    /// Enemies at the player's location (zero or one)
    pub fn enemies(&self) -> ActionReport<Vec<Enemy>> {
        let enemies = self.world.read().enemy.iter().cloned().collect();
        self.report(enemies)
    }

    /// "To the north is ..." summary of the four exits
    pub fn exits(&self) -> ActionReport<String> {
        let text = {
            let world = self.world.read();
            world.describe_exits(world.player.position(), false)
        };
        self.report(text)
    }

    pub fn command_states(&self) -> CommandStates {
        CommandStates::of(&self.world.read())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn report<T>(&self, outcome: T) -> ActionReport<T> {
        ActionReport {
            outcome,
            commands: self.command_states(),
        }
    }

    async fn here(&self) -> Result<Location, GameError> {
        let position = self.position();
        Ok(self.locations.get_or_create(&self.world, position).await?)
    }

    /// Re-roll a player left dead by a reset that could not finish
    async fn ensure_alive(&self) -> Result<(), GameError> {
        let dead = self.world.read().player.combatant.is_defeated();
        if dead {
            log::info!("Player is dead, generating a new world");
            self.combat.reset_world(&self.world).await?;
            self.autosave().await;
        }
        Ok(())
    }

    /// Persist after a command. The command has already changed the world,
    /// so a failed save is logged and the command still reports its outcome.
    async fn autosave(&self) {
        if !self.autosave {
            return;
        }
        if let Err(e) = self.save().await {
            log::warn!("Autosave failed: {}", e);
        }
    }
}

/// Content generator for the configured engine, bounded by the configured timeout
async fn build_content(config: &GameConfig, dice: Arc<Dice>) -> Result<Arc<dyn ContentGenerator>, GameError> {
    let timeout = config.generation_timeout();
    let content: Arc<dyn ContentGenerator> = match &config.engine {
        EngineConfig::Placeholder => {
            log::info!("Using the offline placeholder engine");
            Arc::new(Deadline::new(PromptedGenerator::new(PlaceholderEngine::new(dice)), timeout))
        }
        EngineConfig::OpenAi {
            base_url,
            text_model,
            image_model,
            token_file,
        } => {
            let token = read_token(Path::new(token_file)).await?;
            log::info!("Using {} at {}", text_model, base_url);
            let engine = OpenAiEngine::with_timeout(base_url, text_model, image_model, &token, timeout.as_secs());
            Arc::new(Deadline::new(PromptedGenerator::new(engine), timeout))
        }
    };
    Ok(content)
}

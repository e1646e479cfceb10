//! Combat system

pub mod combatant;
pub mod damage;
pub mod encounter;

pub use combatant::{Combatant, Enemy, Player, TransferOutcome};
pub use damage::{apply_damage, attack, AttackResult};
pub use encounter::{AttackOutcome, CombatCoordinator};

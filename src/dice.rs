//! Shared random source
//!
//! Every roll in the game (stats, encounters, item spawns, attacks) draws
//! from one generator, so a configured seed reproduces a whole run.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Thread-safe wrapper around the game's RNG
#[derive(Debug)]
pub struct Dice {
    rng: Mutex<StdRng>,
}

impl Dice {
    /// Seed from the operating system
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic dice for reproducible runs and tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Seeded when a seed is configured, entropy otherwise
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }

    /// Run `f` with exclusive access to the generator.
    ///
    /// The lock is synchronous: never await inside `f`.
    pub fn roll<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock();
        f(&mut rng)
    }

    /// Bernoulli trial; probabilities outside [0, 1] (or NaN) are clamped
    pub fn chance(&self, probability: f64) -> bool {
        if !(probability > 0.0) {
            return false;
        }
        let p = probability.min(1.0);
        self.roll(|rng| rng.gen_bool(p))
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self::from_entropy()
    }
}

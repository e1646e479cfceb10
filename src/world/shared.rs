//! Shared world handle
//!
//! The single live world behind a lock, plus an epoch that changes whenever
//! the whole world is replaced (load or defeat reset). Generators capture the
//! epoch before a slow call and discard their result if it moved.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::grid::World;

pub struct SharedWorld {
    world: RwLock<World>,
    epoch: AtomicU64,
}

impl SharedWorld {
    pub fn new(world: World) -> Self {
        Self {
            world: RwLock::new(world),
            epoch: AtomicU64::new(0),
        }
    }

    /// Never hold the guard across an `.await`
    pub fn read(&self) -> RwLockReadGuard<'_, World> {
        self.world.read()
    }

    /// Never hold the guard across an `.await`
    pub fn write(&self) -> RwLockWriteGuard<'_, World> {
        self.world.write()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    /// Swap in a brand-new world and return the old one
    pub fn replace(&self, world: World) -> World {
        let mut guard = self.world.write();
        self.epoch.fetch_add(1, Ordering::SeqCst);
        std::mem::replace(&mut *guard, world)
    }

    /// Clone of the current world, e.g. for saving
    pub fn snapshot(&self) -> World {
        self.world.read().clone()
    }
}

//! Registry-wide upkeep passes, one per periodic task.
//!
//! Each pass copies the network list first so no registry lock is held
//! while containers are touched.

use crate::registry::NetworkRegistry;
use netstore_engine::{ContainerSource, UnitLayout};
use tracing::debug;

impl NetworkRegistry {
    /// Prunes dead members from every network. Returns how many were removed.
    pub fn prune_all(&self, source: &dyn ContainerSource) -> usize {
        self.networks()
            .iter()
            .map(|network| network.prune(source).len())
            .sum()
    }

    /// Moves members left on a stale single-cell key onto their unit's key.
    /// Returns how many were moved.
    pub fn rekey_all(&self, layout: &dyn UnitLayout) -> usize {
        self.networks()
            .iter()
            .map(|network| network.rekey_members(layout).len())
            .sum()
    }

    /// Drains every network's feeders. Returns the total items moved.
    pub fn drain_all_feeders(&self, source: &mut dyn ContainerSource) -> u64 {
        let mut moved = 0u64;
        for network in self.networks() {
            moved += u64::from(network.drain_feeders(source).moved);
        }
        if moved > 0 {
            debug!(moved, "Feeder pass complete");
        }
        moved
    }

    /// Rebuilds every network's catalog. Returns how many were rebuilt.
    pub fn rebuild_all_caches(&self, source: &dyn ContainerSource) -> usize {
        let networks = self.networks();
        for network in &networks {
            network.rebuild_cache(source);
        }
        networks.len()
    }
}

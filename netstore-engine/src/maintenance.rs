//! Periodic upkeep: dropping dead members and draining feeders.

use crate::container::{ContainerSource, Presence, UnitLayout};
use crate::network::Network;
use crate::normalize::normalize;
use netstore_types::{CanonicalRef, Role};
use tracing::{debug, info};

/// Outcome of one feeder drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Items moved into storage.
    pub moved: u32,
    /// Feeders that were reachable and visited.
    pub feeders: usize,
}

impl Network {
    /// Removes members the source reports as [`Presence::Gone`].
    ///
    /// Unloaded members are kept.
    pub fn prune(&self, source: &dyn ContainerSource) -> Vec<CanonicalRef> {
        let mut pruned = Vec::new();
        for role in Role::ALL {
            for at in self.members(role) {
                if source.presence(&at) == Presence::Gone && self.remove_key(&at).is_some() {
                    pruned.push(at);
                }
            }
        }
        if !pruned.is_empty() {
            info!(network = %self.id(), count = pruned.len(), "pruned missing members");
        }
        pruned
    }

    /// Moves members registered under a single cell that has since joined a
    /// two-cell unit onto the unit's canonical key. Returns the new keys.
    pub fn rekey_members(&self, layout: &dyn UnitLayout) -> Vec<CanonicalRef> {
        let mut moved = Vec::new();
        for role in Role::ALL {
            for at in self.members(role) {
                let canonical = normalize(at.location(), layout);
                if canonical != at && self.index().rekey(&at, canonical.clone(), self.id()) {
                    debug!(network = %self.id(), %role, from = %at, to = %canonical, "member rekeyed");
                    moved.push(canonical);
                }
            }
        }
        if !moved.is_empty() {
            self.mark_dirty();
        }
        moved
    }

    /// Moves feeder contents into storage.
    ///
    /// Whatever storage cannot take stays in the feeder slot it came from.
    /// Moved items are credited to the owner's deposit counter.
    pub fn drain_feeders(&self, source: &mut dyn ContainerSource) -> DrainReport {
        let mut report = DrainReport::default();
        for feeder in self.members(Role::Feeder) {
            let Some(slots) = source.container(&feeder).map(|c| c.slots()) else {
                continue;
            };
            report.feeders += 1;
            for (index, slot) in slots.into_iter().enumerate() {
                let Some(stack) = slot.filter(|s| !s.is_empty()) else {
                    continue;
                };
                let offered = stack.count;
                let remainder = self.deposit(source, stack);
                let left = remainder.as_ref().map_or(0, |r| r.count);
                if left == offered {
                    continue;
                }
                if let Some(container) = source.container_mut(&feeder) {
                    container.set_slot(index as u32, remainder);
                }
                report.moved = report.moved.saturating_add(offered.saturating_sub(left));
            }
        }
        if let Some(owner) = self.owner() {
            self.record_deposited(owner, report.moved);
        }
        if report.moved > 0 {
            debug!(network = %self.id(), moved = report.moved, "drained feeders");
        }
        report
    }
}

//! Aggregation and item transfers across storage members.
//!
//! Every operation snapshots the storage member list first and then visits
//! members in reference order. Members the source cannot resolve are
//! skipped silently. Feeders and terminals never hold network contents.

use crate::catalog::{Catalog, percent};
use crate::container::ContainerSource;
use crate::network::Network;
use netstore_types::{ItemStack, ItemType, PlayerId, Role};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use tracing::debug;

/// Result of a deposit made on behalf of a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositReport {
    pub requested: u32,
    pub stored: u32,
    /// What did not fit; hand it back to the player.
    pub remainder: Option<ItemStack>,
}

impl DepositReport {
    pub fn is_partial(&self) -> bool {
        self.stored < self.requested
    }
}

/// Result of a withdrawal made on behalf of a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawReport {
    pub requested: u32,
    pub removed: ItemStack,
}

impl WithdrawReport {
    pub fn is_partial(&self) -> bool {
        self.removed.count < self.requested
    }
}

#[derive(Debug, Default)]
struct Scan {
    counts: HashMap<ItemType, u32>,
    used_slots: u32,
    total_slots: u32,
}

impl Network {
    fn scan(&self, source: &dyn ContainerSource) -> Scan {
        let mut scan = Scan::default();
        for at in self.members(Role::Storage) {
            let Some(container) = source.container(&at) else {
                continue;
            };
            scan.total_slots = scan.total_slots.saturating_add(container.size());
            for stack in container.slots().into_iter().flatten() {
                if stack.is_empty() {
                    continue;
                }
                scan.used_slots = scan.used_slots.saturating_add(1);
                let count = scan.counts.entry(stack.item).or_insert(0);
                *count = count.saturating_add(stack.count);
            }
        }
        scan
    }

    /// Total count per item type over every reachable storage member.
    pub fn aggregate(&self, source: &dyn ContainerSource) -> HashMap<ItemType, u32> {
        self.scan(source).counts
    }

    pub fn item_count(&self, source: &dyn ContainerSource, item: &ItemType) -> u32 {
        self.members(Role::Storage)
            .iter()
            .filter_map(|at| source.container(at))
            .flat_map(|container| container.slots())
            .flatten()
            .filter(|stack| stack.item == *item)
            .fold(0u32, |acc, stack| acc.saturating_add(stack.count))
    }

    /// Percentage of occupied slots; 0 when no storage is reachable.
    pub fn capacity_percent(&self, source: &dyn ContainerSource) -> f64 {
        let scan = self.scan(source);
        percent(scan.used_slots, scan.total_slots)
    }

    /// Spreads `stack` over storage members and returns what did not fit.
    ///
    /// Each member tops up its own partial stacks before using empty slots;
    /// the next member is only tried with whatever the previous one refused.
    pub fn deposit(
        &self,
        source: &mut dyn ContainerSource,
        stack: ItemStack,
    ) -> Option<ItemStack> {
        if stack.is_empty() {
            return None;
        }
        let mut remainder = stack;
        for at in self.members(Role::Storage) {
            let Some(container) = source.container_mut(&at) else {
                continue;
            };
            match container.best_effort_insert(remainder) {
                Some(rest) => remainder = rest,
                None => return None,
            }
        }
        Some(remainder)
    }

    /// Removes up to `amount` of `item` and returns what was actually taken.
    pub fn withdraw(
        &self,
        source: &mut dyn ContainerSource,
        item: &ItemType,
        amount: u32,
    ) -> ItemStack {
        let mut remaining = amount;
        for at in self.members(Role::Storage) {
            if remaining == 0 {
                break;
            }
            let Some(container) = source.container_mut(&at) else {
                continue;
            };
            for (index, slot) in container.slots().into_iter().enumerate() {
                if remaining == 0 {
                    break;
                }
                let Some(stack) = slot.filter(|s| s.item == *item && !s.is_empty()) else {
                    continue;
                };
                let taken = stack.count.min(remaining);
                let left = stack.count - taken;
                container.set_slot(index as u32, (left > 0).then(|| stack.with_count(left)));
                remaining -= taken;
            }
        }
        item.stack(amount - remaining)
    }

    /// Deposits and credits `player` with whatever was stored.
    pub fn deposit_for(
        &self,
        player: PlayerId,
        source: &mut dyn ContainerSource,
        stack: ItemStack,
    ) -> DepositReport {
        let requested = stack.count;
        let remainder = self.deposit(source, stack);
        let stored = requested.saturating_sub(remainder.as_ref().map_or(0, |r| r.count));
        self.record_deposited(player, stored);
        debug!(network = %self.id(), %player, requested, stored, "deposit");
        DepositReport {
            requested,
            stored,
            remainder,
        }
    }

    /// Withdraws and charges `player` with whatever was removed.
    pub fn withdraw_for(
        &self,
        player: PlayerId,
        source: &mut dyn ContainerSource,
        item: &ItemType,
        amount: u32,
    ) -> WithdrawReport {
        let removed = self.withdraw(source, item, amount);
        self.record_withdrawn(player, removed.count);
        debug!(network = %self.id(), %player, requested = amount, removed = removed.count, "withdraw");
        WithdrawReport {
            requested: amount,
            removed,
        }
    }

    /// Rebuilds the catalog from one scan and publishes it.
    pub fn rebuild_cache(&self, source: &dyn ContainerSource) -> Arc<Catalog> {
        let scan = self.scan(source);
        let catalog = Arc::new(Catalog::new(scan.counts, scan.used_slots, scan.total_slots));
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&catalog));
        catalog
    }

    /// The last published catalog, if any has been built.
    pub fn catalog(&self) -> Option<Arc<Catalog>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

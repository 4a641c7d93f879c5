//! The network: a named set of member containers with one owner.
//!
//! Membership lives in a [`MembershipIndex`] that may be shared with other
//! networks; everything else is owned here. All methods take `&self` so a
//! network can sit behind an `Arc` and be used from several threads. Locks
//! are never held while container contents are touched.

use crate::access::NetworkMode;
use crate::catalog::Catalog;
use crate::container::UnitLayout;
use crate::error::NetworkResult;
use crate::membership::{Limits, Membership, MembershipIndex};
use crate::normalize::UnitKeys;
use crate::stats::{PlayerStat, StatsLedger};
use netstore_types::{CanonicalRef, ContainerRef, NetworkId, PlayerId, Role};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

#[derive(Debug)]
pub struct Network {
    id: NetworkId,
    name: RwLock<String>,
    owner: Option<PlayerId>,
    pub(crate) trusted: RwLock<BTreeSet<PlayerId>>,
    stats: StatsLedger,
    index: Arc<MembershipIndex>,
    limits: Limits,
    pub(crate) cache: RwLock<Option<Arc<Catalog>>>,
    dirty: AtomicBool,
}

impl Network {
    /// Creates a player-owned network with its own private index.
    pub fn new(name: impl Into<String>, owner: PlayerId) -> Self {
        Self::with_index(
            NetworkId::new(),
            name,
            Some(owner),
            Arc::new(MembershipIndex::new()),
            Limits::default(),
        )
    }

    /// Creates the ownerless network used in global mode.
    pub fn global(name: impl Into<String>) -> Self {
        Self::with_index(
            NetworkId::new(),
            name,
            None,
            Arc::new(MembershipIndex::new()),
            Limits::default(),
        )
    }

    /// Creates a network that claims members in a shared index.
    ///
    /// New networks start dirty so the first flush persists them.
    pub fn with_index(
        id: NetworkId,
        name: impl Into<String>,
        owner: Option<PlayerId>,
        index: Arc<MembershipIndex>,
        limits: Limits,
    ) -> Self {
        Self {
            id,
            name: RwLock::new(name.into()),
            owner,
            trusted: RwLock::new(BTreeSet::new()),
            stats: StatsLedger::new(),
            index,
            limits,
            cache: RwLock::new(None),
            dirty: AtomicBool::new(true),
        }
    }

    pub(crate) fn with_stats(mut self, stats: StatsLedger) -> Self {
        self.stats = stats;
        self
    }

    pub fn id(&self) -> NetworkId {
        self.id
    }

    pub fn name(&self) -> String {
        self.name.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replaces the display name. Uniqueness is the caller's concern.
    pub fn rename(&self, name: impl Into<String>) {
        *self.name.write().unwrap_or_else(PoisonError::into_inner) = name.into();
        self.mark_dirty();
    }

    /// `None` for the global network.
    pub fn owner(&self) -> Option<PlayerId> {
        self.owner
    }

    pub fn is_owner(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }

    pub fn mode(&self) -> NetworkMode {
        if self.owner.is_some() {
            NetworkMode::Player
        } else {
            NetworkMode::Global
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn index(&self) -> &Arc<MembershipIndex> {
        &self.index
    }

    // ── Membership ──────────────────────────────────────────────────

    /// Registers the container at `at` in `role` and returns its canonical key.
    ///
    /// Fails if the unit is already a member anywhere (any role, any
    /// network), if the other half of a two-cell unit is, or if the role is
    /// at its limit. Nothing changes on failure.
    pub fn add_member(
        &self,
        role: Role,
        at: &ContainerRef,
        layout: &dyn UnitLayout,
    ) -> NetworkResult<CanonicalRef> {
        let keys = UnitKeys::resolve(at, layout);
        let membership = Membership {
            network: self.id,
            role,
        };
        self.index.claim(&keys, membership, self.limits.for_role(role))?;
        self.mark_dirty();
        debug!(network = %self.id, %role, at = %keys.canonical, "member added");
        Ok(keys.canonical)
    }

    /// Removes the unit at `at` from this network. Returns the role it held,
    /// or `None` if it was not a member here. Marks the network dirty either
    /// way.
    pub fn remove_member(&self, at: &ContainerRef, layout: &dyn UnitLayout) -> Option<Role> {
        let keys = UnitKeys::resolve(at, layout);
        self.mark_dirty();
        let role = self.index.release(&keys, self.id)?;
        debug!(network = %self.id, %role, at = %keys.canonical, "member removed");
        Some(role)
    }

    pub(crate) fn remove_key(&self, at: &CanonicalRef) -> Option<Role> {
        let role = self.index.release_key(at, self.id)?;
        self.mark_dirty();
        Some(role)
    }

    /// The role the unit at `at` holds in this network, if any.
    pub fn role_of(&self, at: &ContainerRef, layout: &dyn UnitLayout) -> Option<Role> {
        let keys = UnitKeys::resolve(at, layout);
        self.index
            .lookup_unit(&keys)
            .filter(|(_, m)| m.network == self.id)
            .map(|(_, m)| m.role)
    }

    /// Snapshot of one role's members, in reference order.
    pub fn members(&self, role: Role) -> Vec<CanonicalRef> {
        self.index.members(self.id, role)
    }

    pub fn member_count(&self, role: Role) -> usize {
        self.index.count(self.id, role)
    }

    // ── Stats ───────────────────────────────────────────────────────

    pub fn stats(&self) -> &StatsLedger {
        &self.stats
    }

    pub fn stat(&self, player: PlayerId) -> Option<PlayerStat> {
        self.stats.get(player)
    }

    pub fn record_deposited(&self, player: PlayerId, amount: u32) {
        if amount > 0 {
            self.stats.record_deposited(player, amount);
            self.mark_dirty();
        }
    }

    pub fn record_withdrawn(&self, player: PlayerId, amount: u32) {
        if amount > 0 {
            self.stats.record_withdrawn(player, amount);
            self.mark_dirty();
        }
    }

    // ── Dirty tracking ──────────────────────────────────────────────

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    /// Clears the flag and returns whether it was set.
    ///
    /// A flush calls this before snapshotting and calls
    /// [`mark_dirty`](Self::mark_dirty) again if the write fails, so
    /// changes made during the write are never lost.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }
}

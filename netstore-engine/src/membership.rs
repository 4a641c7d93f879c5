//! Cross-network membership index.
//!
//! A container reference belongs to at most one role of at most one
//! network. The index keeps a single reference-to-owner map as the source of
//! truth plus per-network role views for iteration, both behind one lock so
//! the check-then-insert in [`MembershipIndex::claim`] is atomic.

use crate::error::{NetworkError, NetworkResult};
use crate::normalize::UnitKeys;
use netstore_types::{CanonicalRef, NetworkId, Role};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Who owns a claimed reference, and in which role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Membership {
    pub network: NetworkId,
    pub role: Role,
}

/// Per-role member caps for one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub storage: usize,
    pub terminals: usize,
    pub feeders: usize,
}

impl Limits {
    /// Limits that never reject.
    pub const UNLIMITED: Self = Self {
        storage: usize::MAX,
        terminals: usize::MAX,
        feeders: usize::MAX,
    };

    #[must_use]
    pub fn for_role(&self, role: Role) -> usize {
        match role {
            Role::Storage => self.storage,
            Role::Terminal => self.terminals,
            Role::Feeder => self.feeders,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            storage: 100,
            terminals: 100,
            feeders: 100,
        }
    }
}

#[derive(Debug, Default)]
struct RoleSets {
    storage: BTreeSet<CanonicalRef>,
    terminals: BTreeSet<CanonicalRef>,
    feeders: BTreeSet<CanonicalRef>,
}

impl RoleSets {
    fn get(&self, role: Role) -> &BTreeSet<CanonicalRef> {
        match role {
            Role::Storage => &self.storage,
            Role::Terminal => &self.terminals,
            Role::Feeder => &self.feeders,
        }
    }

    fn get_mut(&mut self, role: Role) -> &mut BTreeSet<CanonicalRef> {
        match role {
            Role::Storage => &mut self.storage,
            Role::Terminal => &mut self.terminals,
            Role::Feeder => &mut self.feeders,
        }
    }
}

#[derive(Debug, Default)]
struct IndexState {
    owners: HashMap<CanonicalRef, Membership>,
    views: HashMap<NetworkId, RoleSets>,
}

impl IndexState {
    fn insert(&mut self, at: CanonicalRef, membership: Membership) {
        self.views
            .entry(membership.network)
            .or_default()
            .get_mut(membership.role)
            .insert(at.clone());
        self.owners.insert(at, membership);
    }

    fn remove(&mut self, at: &CanonicalRef) -> Option<Membership> {
        let membership = self.owners.remove(at)?;
        if let Some(view) = self.views.get_mut(&membership.network) {
            view.get_mut(membership.role).remove(at);
        }
        Some(membership)
    }
}

/// Shared index of which network owns which container reference.
#[derive(Debug, Default)]
pub struct MembershipIndex {
    state: RwLock<IndexState>,
}

impl MembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims `keys.canonical` for `membership`.
    ///
    /// Checks, in order: the unit is unclaimed anywhere, the partner cell is
    /// unclaimed anywhere, and the role is below `limit`.
    pub fn claim(&self, keys: &UnitKeys, membership: Membership, limit: usize) -> NetworkResult<()> {
        let mut state = self.write();

        for own in std::iter::once(&keys.canonical).chain(keys.cell.as_ref()) {
            if let Some(existing) = state.owners.get(own) {
                return Err(NetworkError::AlreadyMember {
                    at: own.clone(),
                    network: existing.network,
                    role: existing.role,
                });
            }
        }

        if let Some(partner) = &keys.partner {
            if let Some(existing) = state.owners.get(partner) {
                return Err(NetworkError::PartnerAlreadyMember {
                    at: keys.canonical.clone(),
                    partner: partner.clone(),
                    network: existing.network,
                    role: existing.role,
                });
            }
        }

        let current = state
            .views
            .get(&membership.network)
            .map_or(0, |view| view.get(membership.role).len());
        if current >= limit {
            return Err(NetworkError::LimitExceeded {
                role: membership.role,
                limit,
            });
        }

        state.insert(keys.canonical.clone(), membership);
        Ok(())
    }

    /// Re-inserts a persisted member, bypassing limits.
    ///
    /// Returns the existing owner if `at` is already claimed by someone else.
    pub fn restore(&self, at: CanonicalRef, membership: Membership) -> Result<(), Membership> {
        let mut state = self.write();
        match state.owners.get(&at) {
            Some(existing) if *existing != membership => Err(*existing),
            Some(_) => Ok(()),
            None => {
                state.insert(at, membership);
                Ok(())
            }
        }
    }

    /// Releases whichever of `keys` `network` owns. Returns the role freed.
    pub fn release(&self, keys: &UnitKeys, network: NetworkId) -> Option<Role> {
        let mut state = self.write();
        let mut freed = None;
        for key in keys.all() {
            if state.owners.get(key).is_some_and(|m| m.network == network) {
                freed = state.remove(key).map(|m| m.role).or(freed);
            }
        }
        freed
    }

    /// Releases one exact key if `network` owns it.
    pub fn release_key(&self, at: &CanonicalRef, network: NetworkId) -> Option<Role> {
        let mut state = self.write();
        if state.owners.get(at).is_some_and(|m| m.network == network) {
            state.remove(at).map(|m| m.role)
        } else {
            None
        }
    }

    /// Moves `network`'s claim from `from` to `to`, keeping its role.
    ///
    /// Returns false if `network` does not own `from` or `to` is taken.
    pub fn rekey(&self, from: &CanonicalRef, to: CanonicalRef, network: NetworkId) -> bool {
        let mut state = self.write();
        if state.owners.contains_key(&to)
            || !state.owners.get(from).is_some_and(|m| m.network == network)
        {
            return false;
        }
        match state.remove(from) {
            Some(membership) => {
                state.insert(to, membership);
                true
            }
            None => false,
        }
    }

    /// Drops every claim held by `network`. Returns the freed references.
    pub fn release_network(&self, network: NetworkId) -> Vec<CanonicalRef> {
        let mut state = self.write();
        let Some(view) = state.views.remove(&network) else {
            return Vec::new();
        };
        let freed: Vec<CanonicalRef> = Role::ALL
            .iter()
            .flat_map(|role| view.get(*role).iter().cloned())
            .collect();
        for at in &freed {
            state.owners.remove(at);
        }
        freed
    }

    pub fn lookup(&self, at: &CanonicalRef) -> Option<Membership> {
        self.read().owners.get(at).copied()
    }

    /// Looks up every key of a unit, canonical first.
    pub fn lookup_unit(&self, keys: &UnitKeys) -> Option<(CanonicalRef, Membership)> {
        let state = self.read();
        keys.all()
            .find_map(|key| state.owners.get(key).map(|m| (key.clone(), *m)))
    }

    /// Members of one role of one network, in reference order.
    pub fn members(&self, network: NetworkId, role: Role) -> Vec<CanonicalRef> {
        self.read()
            .views
            .get(&network)
            .map(|view| view.get(role).iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn count(&self, network: NetworkId, role: Role) -> usize {
        self.read()
            .views
            .get(&network)
            .map_or(0, |view| view.get(role).len())
    }

    /// Total number of claimed references across all networks.
    pub fn len(&self) -> usize {
        self.read().owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

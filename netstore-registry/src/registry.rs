//! Central network registry.
//!
//! Owns every live `Network` by name, shares one `MembershipIndex` across
//! all of them so a container can only ever join one network, and mediates
//! persistence through a `NetworkStore`. Hosts construct one registry and
//! pass it by reference to whatever needs it.

use crate::config::NetstoreConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::store::{MemoryStore, NetworkStore};
use netstore_engine::{
    CapabilityCheck, MembershipIndex, Network, NetworkMode, TrustChange, UnitKeys, UnitLayout,
};
use netstore_types::{CanonicalRef, ContainerRef, NetworkId, PlayerId, Role};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{error, info, warn};

/// Longest accepted network name, in characters.
pub const MAX_NAME_LEN: usize = 48;

/// Outcome of [`NetworkRegistry::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    /// Names of persisted networks that were skipped.
    pub skipped: Vec<String>,
    /// Members dropped because another network already held them.
    pub rejected_members: Vec<CanonicalRef>,
}

pub struct NetworkRegistry {
    config: NetstoreConfig,
    index: Arc<MembershipIndex>,
    networks: RwLock<HashMap<String, Arc<Network>>>,
    store: Box<dyn NetworkStore>,
    /// Set when a network is deleted; per-network flags cannot express that.
    removed: AtomicBool,
}

impl NetworkRegistry {
    pub fn new(config: NetstoreConfig, store: Box<dyn NetworkStore>) -> Self {
        Self {
            config,
            index: Arc::new(MembershipIndex::new()),
            networks: RwLock::new(HashMap::new()),
            store,
            removed: AtomicBool::new(false),
        }
    }

    /// Creates a registry and restores everything the store holds.
    pub fn open(config: NetstoreConfig, store: Box<dyn NetworkStore>) -> RegistryResult<Self> {
        let registry = Self::new(config, store);
        registry.load()?;
        Ok(registry)
    }

    /// A registry backed by a [`MemoryStore`].
    pub fn in_memory(config: NetstoreConfig) -> Self {
        Self::new(config, Box::new(MemoryStore::new()))
    }

    pub fn config(&self) -> &NetstoreConfig {
        &self.config
    }

    pub fn index(&self) -> &Arc<MembershipIndex> {
        &self.index
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Network>>> {
        self.networks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Network>>> {
        self.networks.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn build(&self, name: &str, owner: Option<PlayerId>) -> Arc<Network> {
        Arc::new(Network::with_index(
            NetworkId::new(),
            name,
            owner,
            Arc::clone(&self.index),
            self.config.limits(),
        ))
    }

    // ================================================================
    // Lifecycle
    // ================================================================

    /// Creates a network owned by `owner`.
    pub fn create(&self, owner: PlayerId, name: &str) -> RegistryResult<Arc<Network>> {
        let name = validate_name(name)?;
        let mut networks = self.write();
        if networks.contains_key(name) {
            return Err(RegistryError::NameTaken(name.to_string()));
        }
        let network = self.build(name, Some(owner));
        networks.insert(name.to_string(), Arc::clone(&network));
        info!(network = %network.id(), owner = %owner, "Network '{}' created", name);
        Ok(network)
    }

    /// Moves a network to a new name. Allowed for the owner or an admin.
    pub fn rename(
        &self,
        caller: PlayerId,
        caps: &dyn CapabilityCheck,
        old: &str,
        new: &str,
    ) -> RegistryResult<()> {
        let new = validate_name(new)?;
        let mut networks = self.write();
        let network = networks
            .get(old)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownNetwork(old.to_string()))?;
        if networks.contains_key(new) {
            return Err(RegistryError::NameTaken(new.to_string()));
        }
        if !network.is_owner(caller) && !caps.has_admin_override(caller) {
            return Err(netstore_engine::NetworkError::NotOwner {
                player: caller,
                network: old.to_string(),
            }
            .into());
        }
        networks.remove(old);
        network.rename(new);
        networks.insert(new.to_string(), Arc::clone(&network));
        info!(network = %network.id(), "Network '{}' renamed to '{}'", old, new);
        Ok(())
    }

    /// Removes a network and frees every container it held.
    pub fn delete(&self, name: &str) -> RegistryResult<Arc<Network>> {
        let network = self
            .write()
            .remove(name)
            .ok_or_else(|| RegistryError::UnknownNetwork(name.to_string()))?;
        let freed = self.index.release_network(network.id());
        self.removed.store(true, Ordering::Release);
        info!(network = %network.id(), members = freed.len(), "Network '{}' deleted", name);
        Ok(network)
    }

    // ================================================================
    // Lookup
    // ================================================================

    pub fn get(&self, name: &str) -> Option<Arc<Network>> {
        self.read().get(name).cloned()
    }

    pub fn get_by_id(&self, id: NetworkId) -> Option<Arc<Network>> {
        self.read().values().find(|n| n.id() == id).cloned()
    }

    /// Every network, ordered by name.
    pub fn networks(&self) -> Vec<Arc<Network>> {
        let mut all: Vec<Arc<Network>> = self.read().values().cloned().collect();
        all.sort_by_key(|n| n.name());
        all
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// The network holding the unit at `at`, and its role there.
    pub fn locate(
        &self,
        at: &ContainerRef,
        layout: &dyn UnitLayout,
    ) -> Option<(Arc<Network>, Role)> {
        let keys = UnitKeys::resolve(at, layout);
        let (_, membership) = self.index.lookup_unit(&keys)?;
        self.get_by_id(membership.network)
            .map(|network| (network, membership.role))
    }

    /// Networks owned by `player`, ordered by name.
    pub fn owned_by(&self, player: PlayerId) -> Vec<Arc<Network>> {
        self.networks()
            .into_iter()
            .filter(|n| n.is_owner(player))
            .collect()
    }

    /// Networks `player` may use, ordered by name.
    pub fn accessible_to(&self, player: PlayerId, caps: &dyn CapabilityCheck) -> Vec<Arc<Network>> {
        self.networks()
            .into_iter()
            .filter(|n| n.can_access(player, caps))
            .collect()
    }

    /// The shared network used in global mode, created on first use.
    pub fn global(&self) -> RegistryResult<Arc<Network>> {
        let name = validate_name(&self.config.global_network_name)?;
        let mut networks = self.write();
        if let Some(existing) = networks.get(name) {
            return match existing.owner() {
                None => Ok(Arc::clone(existing)),
                Some(_) => Err(RegistryError::NameTaken(name.to_string())),
            };
        }
        let network = self.build(name, None);
        networks.insert(name.to_string(), Arc::clone(&network));
        info!(network = %network.id(), "Global network '{}' created", name);
        Ok(network)
    }

    /// The network a player works with by default.
    ///
    /// In global mode this is the shared network. Otherwise it is the
    /// player's first owned network, or a new one named after them.
    pub fn resolve_for(&self, player: PlayerId, player_name: &str) -> RegistryResult<Arc<Network>> {
        if self.config.network_mode == NetworkMode::Global {
            return self.global();
        }
        if let Some(owned) = self.owned_by(player).into_iter().next() {
            return Ok(owned);
        }
        let name = format!("{player_name}'s Network");
        match self.create(player, &name) {
            // Lost a race with ourselves on another thread.
            Err(RegistryError::NameTaken(_)) => match self.get(&name) {
                Some(existing) if existing.is_owner(player) => Ok(existing),
                _ => Err(RegistryError::NameTaken(name)),
            },
            other => other,
        }
    }

    // ================================================================
    // Membership and trust
    // ================================================================

    /// Adds the container at `at` to the player's default network.
    pub fn register(
        &self,
        player: PlayerId,
        player_name: &str,
        role: Role,
        at: &ContainerRef,
        layout: &dyn UnitLayout,
    ) -> RegistryResult<(Arc<Network>, CanonicalRef)> {
        let network = self.resolve_for(player, player_name)?;
        let key = network.add_member(role, at, layout)?;
        Ok((network, key))
    }

    /// Removes the container at `at` from whichever network holds it.
    pub fn unregister(
        &self,
        caller: PlayerId,
        caps: &dyn CapabilityCheck,
        at: &ContainerRef,
        layout: &dyn UnitLayout,
    ) -> RegistryResult<(Arc<Network>, Role)> {
        let (network, _) = self
            .locate(at, layout)
            .ok_or_else(|| RegistryError::UnknownReference(at.clone()))?;
        network.ensure_access(caller, caps)?;
        let role = network
            .remove_member(at, layout)
            .ok_or_else(|| RegistryError::UnknownReference(at.clone()))?;
        Ok((network, role))
    }

    fn trust_target(&self, name: &str) -> RegistryResult<Arc<Network>> {
        if !self.config.enable_trust_system {
            return Err(RegistryError::TrustDisabled);
        }
        self.get(name)
            .ok_or_else(|| RegistryError::UnknownNetwork(name.to_string()))
    }

    pub fn trust(&self, caller: PlayerId, network: &str, target: PlayerId) -> RegistryResult<TrustChange> {
        Ok(self.trust_target(network)?.add_trusted(caller, target)?)
    }

    pub fn untrust(&self, caller: PlayerId, network: &str, target: PlayerId) -> RegistryResult<TrustChange> {
        Ok(self.trust_target(network)?.remove_trusted(caller, target)?)
    }

    // ================================================================
    // Persistence
    // ================================================================

    /// Restores every persisted network that does not collide with one
    /// already present, by name or by id.
    pub fn load(&self) -> RegistryResult<LoadReport> {
        let snapshots = self.store.load_all()?;
        let mut report = LoadReport::default();
        let mut networks = self.write();

        for snapshot in snapshots {
            let name = snapshot.name.clone();
            let collides = networks.contains_key(&name)
                || networks.values().any(|n| n.id() == snapshot.id);
            if collides || validate_name(&name).is_err() {
                warn!(network = %snapshot.id, "Skipping persisted network '{}'", name);
                report.skipped.push(name);
                continue;
            }
            let restored = Network::restore(snapshot, Arc::clone(&self.index), self.config.limits());
            report.rejected_members.extend(restored.rejected);
            networks.insert(name, Arc::new(restored.network));
            report.loaded += 1;
        }

        info!(
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "Loaded networks from store"
        );
        Ok(report)
    }

    /// Writes every network, dirty or not.
    ///
    /// On failure the in-memory state stays authoritative and every network
    /// that was dirty stays dirty.
    pub fn save(&self) -> RegistryResult<()> {
        let networks = self.networks();
        let was_removed = self.removed.swap(false, Ordering::AcqRel);
        let taken: Vec<bool> = networks.iter().map(|n| n.take_dirty()).collect();
        let snapshots: Vec<_> = networks.iter().map(|n| n.snapshot()).collect();

        match self.store.save_all(&snapshots) {
            Ok(()) => {
                info!(count = snapshots.len(), "Saved networks");
                Ok(())
            }
            Err(e) => {
                for (network, was_dirty) in networks.iter().zip(taken) {
                    if was_dirty {
                        network.mark_dirty();
                    }
                }
                if was_removed {
                    self.removed.store(true, Ordering::Release);
                }
                error!("Failed to save networks: {}", e);
                Err(e)
            }
        }
    }

    /// True if anything changed since the last successful save.
    pub fn is_dirty(&self) -> bool {
        self.removed.load(Ordering::Acquire) || self.read().values().any(|n| n.is_dirty())
    }

    /// Saves only if something changed. Returns whether a save happened.
    pub fn flush(&self) -> RegistryResult<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }
}

/// Trims and checks a proposed network name.
pub fn validate_name(name: &str) -> RegistryResult<&str> {
    let trimmed = name.trim();
    let valid = !trimmed.is_empty()
        && trimmed.chars().count() <= MAX_NAME_LEN
        && !trimmed.chars().any(char::is_control);
    if valid {
        Ok(trimmed)
    } else {
        Err(RegistryError::InvalidName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(validate_name("  Base  ").unwrap(), "Base");
        assert!(validate_name("   ").is_err());
        assert!(validate_name("tab\there").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN + 1)).is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_LEN)).is_ok());
    }
}

//! Access policy and trust management.
//!
//! In player mode a network is usable by its owner, by players the owner
//! trusts, and by anyone holding the admin override capability. In global
//! mode every player may use the single shared network and trust is
//! meaningless.

use crate::error::{NetworkError, NetworkResult};
use crate::network::Network;
use netstore_types::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::PoisonError;
use tracing::debug;

/// Whether each player gets their own network or everyone shares one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    #[default]
    Player,
    Global,
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::Global => f.write_str("global"),
        }
    }
}

/// Why a player may (or may not) use a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Owner,
    Trusted,
    AdminOverride,
    /// The network is the global one.
    Public,
    Denied,
}

impl AccessLevel {
    pub fn is_granted(self) -> bool {
        !matches!(self, Self::Denied)
    }
}

/// Host-provided capability lookup.
pub trait CapabilityCheck {
    /// True if `player` may bypass ownership and trust checks.
    fn has_admin_override(&self, player: PlayerId) -> bool;
}

/// Grants no overrides to anyone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOverrides;

impl CapabilityCheck for NoOverrides {
    fn has_admin_override(&self, _player: PlayerId) -> bool {
        false
    }
}

/// A fixed set of players holding the admin override.
#[derive(Debug, Clone, Default)]
pub struct AdminList {
    admins: HashSet<PlayerId>,
}

impl AdminList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&mut self, player: PlayerId) {
        self.admins.insert(player);
    }

    pub fn revoke(&mut self, player: PlayerId) {
        self.admins.remove(&player);
    }
}

impl FromIterator<PlayerId> for AdminList {
    fn from_iter<I: IntoIterator<Item = PlayerId>>(iter: I) -> Self {
        Self {
            admins: iter.into_iter().collect(),
        }
    }
}

impl CapabilityCheck for AdminList {
    fn has_admin_override(&self, player: PlayerId) -> bool {
        self.admins.contains(&player)
    }
}

/// Outcome of a trust mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustChange {
    Granted,
    AlreadyTrusted,
    Revoked,
    NotTrusted,
}

impl TrustChange {
    /// True if the trusted set actually changed.
    pub fn changed(self) -> bool {
        matches!(self, Self::Granted | Self::Revoked)
    }
}

impl Network {
    pub fn access_level(&self, player: PlayerId, caps: &dyn CapabilityCheck) -> AccessLevel {
        match self.owner() {
            None => AccessLevel::Public,
            Some(owner) if owner == player => AccessLevel::Owner,
            Some(_) if self.is_trusted(player) => AccessLevel::Trusted,
            Some(_) if caps.has_admin_override(player) => AccessLevel::AdminOverride,
            Some(_) => AccessLevel::Denied,
        }
    }

    pub fn can_access(&self, player: PlayerId, caps: &dyn CapabilityCheck) -> bool {
        self.access_level(player, caps).is_granted()
    }

    /// Like [`can_access`](Self::can_access) but as a `Result`.
    pub fn ensure_access(
        &self,
        player: PlayerId,
        caps: &dyn CapabilityCheck,
    ) -> NetworkResult<AccessLevel> {
        let level = self.access_level(player, caps);
        if level.is_granted() {
            Ok(level)
        } else {
            Err(NetworkError::AccessDenied {
                player,
                network: self.name(),
            })
        }
    }

    pub fn is_trusted(&self, player: PlayerId) -> bool {
        self.trusted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&player)
    }

    /// Trusted players, in id order.
    pub fn trusted(&self) -> Vec<PlayerId> {
        self.trusted
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    fn check_trust_caller(&self, caller: PlayerId, target: PlayerId) -> NetworkResult<()> {
        let Some(owner) = self.owner() else {
            return Err(NetworkError::TrustUnavailable);
        };
        if owner != caller {
            return Err(NetworkError::NotOwner {
                player: caller,
                network: self.name(),
            });
        }
        if target == owner {
            return Err(NetworkError::SelfTrust);
        }
        Ok(())
    }

    /// Lets `target` use this network. Only the owner may call this.
    pub fn add_trusted(&self, caller: PlayerId, target: PlayerId) -> NetworkResult<TrustChange> {
        self.check_trust_caller(caller, target)?;
        let inserted = self
            .trusted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target);
        if !inserted {
            return Ok(TrustChange::AlreadyTrusted);
        }
        self.mark_dirty();
        debug!(network = %self.id(), player = %target, "player trusted");
        Ok(TrustChange::Granted)
    }

    /// Revokes `target`'s trust. Only the owner may call this.
    pub fn remove_trusted(&self, caller: PlayerId, target: PlayerId) -> NetworkResult<TrustChange> {
        self.check_trust_caller(caller, target)?;
        let removed = self
            .trusted
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&target);
        if !removed {
            return Ok(TrustChange::NotTrusted);
        }
        self.mark_dirty();
        debug!(network = %self.id(), player = %target, "player untrusted");
        Ok(TrustChange::Revoked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn owner_trust_and_override_levels() {
        let owner = PlayerId::random();
        let friend = PlayerId::random();
        let admin = PlayerId::random();
        let stranger = PlayerId::random();
        let net = Network::new("Base", owner);
        net.add_trusted(owner, friend).unwrap();
        let caps: AdminList = [admin].into_iter().collect();

        assert_eq!(net.access_level(owner, &caps), AccessLevel::Owner);
        assert_eq!(net.access_level(friend, &caps), AccessLevel::Trusted);
        assert_eq!(net.access_level(admin, &caps), AccessLevel::AdminOverride);
        assert_eq!(net.access_level(stranger, &caps), AccessLevel::Denied);
        assert_eq!(
            net.ensure_access(stranger, &caps).map_err(|e| e.kind()),
            Err(ErrorKind::AccessDenied)
        );
    }

    #[test]
    fn global_network_is_open_and_has_no_trust() {
        let net = Network::global("global");
        let p = PlayerId::random();
        assert!(net.can_access(p, &NoOverrides));
        assert_eq!(
            net.add_trusted(p, PlayerId::random()),
            Err(NetworkError::TrustUnavailable)
        );
    }

    #[test]
    fn only_owner_mutates_trust() {
        let owner = PlayerId::random();
        let other = PlayerId::random();
        let net = Network::new("Base", owner);

        let err = net.add_trusted(other, PlayerId::random()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
        assert_eq!(net.add_trusted(owner, owner), Err(NetworkError::SelfTrust));
    }

    #[test]
    fn trust_changes_report_noops() {
        let owner = PlayerId::random();
        let friend = PlayerId::random();
        let net = Network::new("Base", owner);

        assert_eq!(net.add_trusted(owner, friend), Ok(TrustChange::Granted));
        assert_eq!(net.add_trusted(owner, friend), Ok(TrustChange::AlreadyTrusted));
        assert_eq!(net.remove_trusted(owner, friend), Ok(TrustChange::Revoked));
        assert_eq!(net.remove_trusted(owner, friend), Ok(TrustChange::NotTrusted));
        assert!(!net.can_access(friend, &NoOverrides));
    }
}

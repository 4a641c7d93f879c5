//! Persisted form of a network.
//!
//! Only durable state is captured: identity, members, trust and stats.
//! Container contents live in the containers themselves and the catalog is
//! rebuilt after load.

use crate::membership::{Limits, Membership, MembershipIndex};
use crate::network::Network;
use crate::stats::{PlayerStat, StatsLedger};
use netstore_types::{CanonicalRef, NetworkId, PlayerId, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    #[serde(default)]
    pub id: NetworkId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<PlayerId>,
    #[serde(default)]
    pub storage: Vec<CanonicalRef>,
    #[serde(default)]
    pub terminals: Vec<CanonicalRef>,
    #[serde(default)]
    pub feeders: Vec<CanonicalRef>,
    #[serde(default)]
    pub trusted: Vec<PlayerId>,
    #[serde(default)]
    pub stats: BTreeMap<PlayerId, PlayerStat>,
}

impl NetworkSnapshot {
    fn members(&self, role: Role) -> &[CanonicalRef] {
        match role {
            Role::Storage => &self.storage,
            Role::Terminal => &self.terminals,
            Role::Feeder => &self.feeders,
        }
    }
}

/// A network rebuilt from a snapshot, plus any members it could not reclaim.
#[derive(Debug)]
pub struct Restored {
    pub network: Network,
    /// Members already claimed by another network in the shared index.
    pub rejected: Vec<CanonicalRef>,
}

impl Network {
    /// Captures durable state. Lists are sorted so output is stable.
    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            id: self.id(),
            name: self.name(),
            owner: self.owner(),
            storage: self.members(Role::Storage),
            terminals: self.members(Role::Terminal),
            feeders: self.members(Role::Feeder),
            trusted: self.trusted(),
            stats: self.stats().snapshot(),
        }
    }

    /// Rebuilds a network, reclaiming its members in `index`.
    ///
    /// Limits are not enforced on restore. A member already owned by another
    /// network is dropped and the result is left dirty so the next flush
    /// persists the corrected list; otherwise the result starts clean.
    pub fn restore(snapshot: NetworkSnapshot, index: Arc<MembershipIndex>, limits: Limits) -> Restored {
        let network = Network::with_index(
            snapshot.id,
            snapshot.name.clone(),
            snapshot.owner,
            index,
            limits,
        )
        .with_stats(StatsLedger::from_entries(snapshot.stats.clone()));

        {
            let mut trusted = network.trusted.write().unwrap_or_else(PoisonError::into_inner);
            trusted.extend(snapshot.trusted.iter().copied().filter(|p| Some(*p) != snapshot.owner));
        }

        let mut rejected = Vec::new();
        for role in Role::ALL {
            for at in snapshot.members(role) {
                let membership = Membership {
                    network: snapshot.id,
                    role,
                };
                if let Err(existing) = network.index().restore(at.clone(), membership) {
                    warn!(
                        network = %snapshot.id,
                        %at,
                        owner = %existing.network,
                        "member already claimed by another network, dropping"
                    );
                    rejected.push(at.clone());
                }
            }
        }

        network.take_dirty();
        if !rejected.is_empty() {
            network.mark_dirty();
        }
        Restored { network, rejected }
    }
}

//! Storage aggregation engine.
//!
//! A [`Network`] groups physical containers into one logical inventory:
//!
//! - **storage** members hold the network's contents
//! - **terminal** members are access points and hold nothing
//! - **feeder** members are periodically drained into storage
//!
//! The engine owns membership, access policy, per-player stats and the
//! cached catalog. It never owns containers: hosts supply them through
//! [`ContainerSource`] for each call and describe multi-cell units through
//! [`UnitLayout`].
//!
//! A container belongs to at most one role of at most one network. Networks
//! that share a [`MembershipIndex`] enforce that across each other.

mod access;
mod catalog;
mod container;
mod error;
mod maintenance;
mod membership;
pub mod memory;
mod network;
mod normalize;
mod snapshot;
mod stats;
mod transfer;

pub use access::{AccessLevel, AdminList, CapabilityCheck, NetworkMode, NoOverrides, TrustChange};
pub use catalog::{Catalog, CatalogEntry, SortOrder};
pub use container::{
    Container, ContainerSource, DEFAULT_MAX_STACK_SIZE, Presence, SingleCells, UnitLayout,
};
pub use error::{ErrorKind, NetworkError, NetworkResult};
pub use maintenance::DrainReport;
pub use membership::{Limits, Membership, MembershipIndex};
pub use network::Network;
pub use normalize::{UnitKeys, normalize};
pub use snapshot::{NetworkSnapshot, Restored};
pub use stats::{PlayerStat, StatsLedger};
pub use transfer::{DepositReport, WithdrawReport};

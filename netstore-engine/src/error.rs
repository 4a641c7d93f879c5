//! Error types for the engine.

use netstore_types::{CanonicalRef, NetworkId, PlayerId, Role};
use thiserror::Error;

/// Result type for engine operations.
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Broad classification of a [`NetworkError`].
///
/// Partial transfers are not errors and never show up here; they are
/// reported through the transfer return values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request conflicts with membership or trust rules.
    Validation,
    /// The caller lacks the owner, trust or admin capability.
    AccessDenied,
}

/// Errors raised by membership, trust and access operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The container is already claimed, here or by another network.
    #[error("{at} is already a {role} member of network {network}")]
    AlreadyMember {
        at: CanonicalRef,
        network: NetworkId,
        role: Role,
    },

    /// The other cell of the same two-cell unit is already claimed.
    #[error("{partner}, the other half of {at}, is already a {role} member of network {network}")]
    PartnerAlreadyMember {
        at: CanonicalRef,
        partner: CanonicalRef,
        network: NetworkId,
        role: Role,
    },

    #[error("{role} limit of {limit} reached")]
    LimitExceeded { role: Role, limit: usize },

    #[error("a network owner cannot trust themselves")]
    SelfTrust,

    /// Trust has no meaning on an ownerless (global) network.
    #[error("trust is unavailable on the global network")]
    TrustUnavailable,

    #[error("player {player} does not own network '{network}'")]
    NotOwner { player: PlayerId, network: String },

    #[error("player {player} may not access network '{network}'")]
    AccessDenied { player: PlayerId, network: String },
}

impl NetworkError {
    /// Returns the taxonomy bucket for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotOwner { .. } | Self::AccessDenied { .. } => ErrorKind::AccessDenied,
            Self::AlreadyMember { .. }
            | Self::PartnerAlreadyMember { .. }
            | Self::LimitExceeded { .. }
            | Self::SelfTrust
            | Self::TrustUnavailable => ErrorKind::Validation,
        }
    }
}

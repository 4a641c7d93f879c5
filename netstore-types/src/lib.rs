//! Core value types for netstore.
//!
//! This crate defines the plain data shared by the engine and the registry:
//! - Player and network identifiers
//! - Item identity (`ItemType`) and counted stacks (`ItemStack`)
//! - Container locations, raw (`ContainerRef`) and canonical (`CanonicalRef`)
//! - Membership roles
//!
//! Nothing here touches containers or holds locks; behavior lives in
//! `netstore-engine`.

mod ids;
mod item;
mod location;
mod role;

pub use ids::{NetworkId, PlayerId};
pub use item::{ItemMeta, ItemStack, ItemType};
pub use location::{CanonicalRef, ContainerRef};
pub use role::Role;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid container reference: {0}")]
    InvalidReference(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

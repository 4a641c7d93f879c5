//! Error types for the registry.

use netstore_engine::{ErrorKind, NetworkError};
use netstore_types::ContainerRef;
use thiserror::Error;

pub type RegistryResult<T> = Result<T, RegistryError>;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("network not found: {0}")]
    UnknownNetwork(String),

    #[error("{0} is not part of any network")]
    UnknownReference(ContainerRef),

    #[error("a network named '{0}' already exists")]
    NameTaken(String),

    #[error("invalid network name: {0:?}")]
    InvalidName(String),

    #[error("the trust system is disabled")]
    TrustDisabled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("storage error: {0}")]
    Storage(String),
}

impl RegistryError {
    /// Taxonomy bucket for request errors; `None` for persistence failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Network(e) => Some(e.kind()),
            Self::UnknownNetwork(_)
            | Self::UnknownReference(_)
            | Self::NameTaken(_)
            | Self::InvalidName(_)
            | Self::TrustDisabled => Some(ErrorKind::Validation),
            Self::Io(_) | Self::Serialization(_) | Self::Config(_) | Self::Storage(_) => None,
        }
    }
}

//! Network registry for the netstore engine.
//!
//! Provides:
//! - [`NetworkRegistry`]: name and reference lookup, lifecycle, trust
//!   gating and persistence
//! - [`NetstoreConfig`]: TOML configuration with defaults
//! - [`NetworkStore`]: persistence backends ([`JsonFileStore`], [`MemoryStore`])

mod config;
mod error;
mod maintenance;
mod registry;
mod store;

pub use config::NetstoreConfig;
pub use error::{RegistryError, RegistryResult};
pub use registry::{LoadReport, MAX_NAME_LEN, NetworkRegistry, validate_name};
pub use store::{JsonFileStore, MemoryStore, NetworkStore, STORE_VERSION};

//! Runtime configuration read from `netstore.toml`.

use crate::error::RegistryResult;
use netstore_engine::{Limits, NetworkMode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Every key is optional; missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NetstoreConfig {
    pub network_mode: NetworkMode,
    pub max_chests_per_network: usize,
    pub max_terminals_per_network: usize,
    pub max_sender_chests_per_network: usize,
    /// Feeder drain period. 0 disables draining.
    pub sender_chest_transfer_interval_seconds: u64,
    /// Persistence flush period. 0 disables auto-save.
    pub auto_save_interval_minutes: u64,
    /// Catalog rebuild period. 0 disables background rebuilds.
    pub cache_resync_interval_minutes: u64,
    pub enable_trust_system: bool,
    pub global_network_name: String,
}

impl Default for NetstoreConfig {
    fn default() -> Self {
        Self {
            network_mode: NetworkMode::Player,
            max_chests_per_network: 100,
            max_terminals_per_network: 100,
            max_sender_chests_per_network: 100,
            sender_chest_transfer_interval_seconds: 5,
            auto_save_interval_minutes: 5,
            cache_resync_interval_minutes: 10,
            enable_trust_system: true,
            global_network_name: "global".to_string(),
        }
    }
}

impl NetstoreConfig {
    /// Loads config from `path`.
    /// Falls back to defaults when the file is missing, unreadable or malformed.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("No config file found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!(mode = %config.network_mode, "Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config file {:?}: {}. Using defaults.", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file {:?}: {}. Using defaults.", path, e);
                Self::default()
            }
        }
    }

    /// Strict parse; errors instead of falling back.
    pub fn from_toml_str(contents: &str) -> RegistryResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Per-role member caps.
    pub fn limits(&self) -> Limits {
        Limits {
            storage: self.max_chests_per_network,
            terminals: self.max_terminals_per_network,
            feeders: self.max_sender_chests_per_network,
        }
    }

    pub fn feeder_interval(&self) -> Option<Duration> {
        nonzero(self.sender_chest_transfer_interval_seconds).map(Duration::from_secs)
    }

    pub fn auto_save_interval(&self) -> Option<Duration> {
        nonzero(self.auto_save_interval_minutes).map(|m| Duration::from_secs(m * 60))
    }

    pub fn cache_resync_interval(&self) -> Option<Duration> {
        nonzero(self.cache_resync_interval_minutes).map(|m| Duration::from_secs(m * 60))
    }

    /// Trust mutation is possible only in player mode with trust enabled.
    pub fn trust_available(&self) -> bool {
        self.enable_trust_system && self.network_mode == NetworkMode::Player
    }
}

fn nonzero(value: u64) -> Option<u64> {
    (value > 0).then_some(value)
}

//! Persistence backends for network snapshots.
//!
//! A store reads and writes the whole set of networks at once. The registry
//! decides when to write; stores only move bytes.

use crate::error::{RegistryError, RegistryResult};
use netstore_engine::NetworkSnapshot;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Current on-disk layout version.
pub const STORE_VERSION: u32 = 1;

pub trait NetworkStore: Send + Sync {
    /// Every persisted network. An empty store yields an empty list.
    fn load_all(&self) -> RegistryResult<Vec<NetworkSnapshot>>;

    /// Replaces the persisted set with `snapshots`.
    fn save_all(&self, snapshots: &[NetworkSnapshot]) -> RegistryResult<()>;
}

impl<S: NetworkStore + ?Sized> NetworkStore for Arc<S> {
    fn load_all(&self) -> RegistryResult<Vec<NetworkSnapshot>> {
        (**self).load_all()
    }

    fn save_all(&self, snapshots: &[NetworkSnapshot]) -> RegistryResult<()> {
        (**self).save_all(snapshots)
    }
}

/// On-disk document.
#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    networks: Vec<NetworkSnapshot>,
}

fn default_version() -> u32 {
    STORE_VERSION
}

impl StoreFile {
    fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Stores all networks in one pretty-printed JSON file.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the previous file intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "networks.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl NetworkStore for JsonFileStore {
    fn load_all(&self) -> RegistryResult<Vec<NetworkSnapshot>> {
        if !self.path.exists() {
            info!("No network file at {:?}, starting empty", self.path);
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let file = StoreFile::from_json(&contents)?;
        if file.version > STORE_VERSION {
            return Err(RegistryError::Storage(format!(
                "{:?} has version {}, newest supported is {}",
                self.path, file.version, STORE_VERSION
            )));
        }
        debug!(count = file.networks.len(), "read network file");
        Ok(file.networks)
    }

    fn save_all(&self, snapshots: &[NetworkSnapshot]) -> RegistryResult<()> {
        let file = StoreFile {
            version: STORE_VERSION,
            networks: snapshots.to_vec(),
        };
        let json = file.to_json()?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        std::fs::write(&temp, json)?;
        std::fs::rename(&temp, &self.path)?;
        debug!(count = snapshots.len(), "wrote network file");
        Ok(())
    }
}

/// Keeps snapshots in memory. Can be told to fail, to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Vec<NetworkSnapshot>>,
    failing: AtomicBool,
    saves: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshots(snapshots: Vec<NetworkSnapshot>) -> Self {
        Self {
            saved: Mutex::new(snapshots),
            ..Self::default()
        }
    }

    /// While set, every `save_all` fails with [`RegistryError::Storage`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Release);
    }

    /// What the last successful save wrote.
    pub fn saved(&self) -> Vec<NetworkSnapshot> {
        self.saved.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NetworkStore for MemoryStore {
    fn load_all(&self) -> RegistryResult<Vec<NetworkSnapshot>> {
        Ok(self.saved())
    }

    fn save_all(&self, snapshots: &[NetworkSnapshot]) -> RegistryResult<()> {
        if self.failing.load(Ordering::Acquire) {
            return Err(RegistryError::Storage("memory store set to fail".to_string()));
        }
        *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = snapshots.to_vec();
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}

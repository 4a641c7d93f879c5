//! Membership roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role a container plays inside a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Aggregated: its contents are part of the network inventory.
    Storage,
    /// Grants interactive access to the aggregate view; not aggregated itself.
    Terminal,
    /// Periodically drained into storage.
    Feeder,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Storage, Role::Terminal, Role::Feeder];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Storage => "storage",
            Self::Terminal => "terminal",
            Self::Feeder => "feeder",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "storage" | "chest" => Ok(Self::Storage),
            "terminal" => Ok(Self::Terminal),
            "feeder" | "sender" => Ok(Self::Feeder),
            _ => Err(crate::Error::UnknownRole(s.to_string())),
        }
    }
}

//! Container locations.
//!
//! A `ContainerRef` points at one cell. Multi-cell containers (two adjacent
//! cells acting as one unit) are tracked through a single `CanonicalRef`,
//! produced by the engine's normalizer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Location of one container cell: world name plus block coordinates.
///
/// Ordering is lexicographic over (world, x, y, z), which the normalizer
/// relies on to pick one cell of a unit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContainerRef {
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ContainerRef {
    pub fn new(world: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }

    /// Returns the location shifted by the given offsets.
    #[must_use]
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            world: self.world.clone(),
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }

    /// The four horizontal neighbours, the only cells that can complete a
    /// two-cell unit.
    #[must_use]
    pub fn horizontal_neighbours(&self) -> [ContainerRef; 4] {
        [
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
            self.offset(0, 0, 1),
            self.offset(0, 0, -1),
        ]
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{},{},{}", self.world, self.x, self.y, self.z)
    }
}

impl FromStr for ContainerRef {
    type Err = crate::Error;

    /// Parses the `world:x,y,z` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || crate::Error::InvalidReference(s.to_string());
        let (world, coords) = s.rsplit_once(':').ok_or_else(invalid)?;
        if world.is_empty() {
            return Err(invalid());
        }
        let parts: Vec<&str> = coords.split(',').collect();
        let [x, y, z] = parts.as_slice() else {
            return Err(invalid());
        };
        let parse = |p: &str| p.trim().parse::<i32>().map_err(|_| invalid());
        Ok(Self::new(world, parse(*x)?, parse(*y)?, parse(*z)?))
    }
}

/// The single identifier tracked for a (possibly multi-cell) container unit.
///
/// Only the engine's normalizer should mint these from live input; the
/// `from_normalized` constructor exists for persistence and adapters that
/// already hold canonical values.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalRef(ContainerRef);

impl CanonicalRef {
    /// Wraps a location the caller knows to be canonical already.
    #[must_use]
    pub const fn from_normalized(location: ContainerRef) -> Self {
        Self(location)
    }

    /// Returns the underlying cell location.
    #[must_use]
    pub const fn location(&self) -> &ContainerRef {
        &self.0
    }

    #[must_use]
    pub fn into_location(self) -> ContainerRef {
        self.0
    }
}

impl fmt::Display for CanonicalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl AsRef<ContainerRef> for CanonicalRef {
    fn as_ref(&self) -> &ContainerRef {
        &self.0
    }
}

//! Player and network identifiers.
//!
//! Both wrap a UUID and serialize as its hyphenated string. Player ids come
//! from the host. Network ids are minted here as UUID v7, so they sort by
//! creation time and survive renames.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// Accepts hyphenated or bare hex, ignoring surrounding whitespace.
            pub fn parse(s: &str) -> Result<Self> {
                Ok(Self(Uuid::parse_str(s.trim())?))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0.hyphenated(), f)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                Self::parse(s)
            }
        }
    };
}

uuid_newtype! {
    /// A player as identified by the host.
    PlayerId
}

uuid_newtype! {
    /// A network. Unlike its name, this never changes.
    NetworkId
}

impl PlayerId {
    /// A fresh random id, for hosts and tests without their own.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl NetworkId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// When the network was created, if the id carries a timestamp.
    ///
    /// Ids loaded from older data files may be random UUIDs, which do not.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let (secs, nanos) = self.0.get_timestamp()?.to_unix();
        DateTime::from_timestamp(i64::try_from(secs).ok()?, nanos)
    }
}

impl Default for NetworkId {
    fn default() -> Self {
        Self::new()
    }
}

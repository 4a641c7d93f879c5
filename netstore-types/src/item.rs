//! Item identity and counted stacks.
//!
//! Two stacks are "similar" when their `ItemType`s are equal. The count is
//! never part of identity.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Durable metadata that distinguishes otherwise identical items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemMeta {
    /// Custom display name, if the item was renamed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Enchantment name to level.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub enchantments: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lore: Vec<String>,
}

impl ItemMeta {
    /// Returns true if no metadata is set.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.display_name.is_none() && self.enchantments.is_empty() && self.lore.is_empty()
    }
}

/// An equality class of items: a kind plus its durable metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemType {
    /// Host-level kind, e.g. `"OAK_LOG"`.
    pub kind: String,
    #[serde(default, skip_serializing_if = "ItemMeta::is_plain")]
    pub meta: ItemMeta,
}

impl ItemType {
    /// Creates a plain item type with no metadata.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            meta: ItemMeta::default(),
        }
    }

    /// Sets a custom display name.
    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.meta.display_name = Some(name.into());
        self
    }

    /// Adds an enchantment.
    #[must_use]
    pub fn with_enchantment(mut self, name: impl Into<String>, level: u32) -> Self {
        self.meta.enchantments.insert(name.into(), level);
        self
    }

    /// Appends a lore line.
    #[must_use]
    pub fn with_lore(mut self, line: impl Into<String>) -> Self {
        self.meta.lore.push(line.into());
        self
    }

    /// Human readable name: the custom name if present, otherwise the kind
    /// lowercased with underscores turned into spaces.
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.meta.display_name {
            Some(name) => name.clone(),
            None => self.kind.replace('_', " ").to_lowercase(),
        }
    }

    /// Creates a stack of this type.
    #[must_use]
    pub fn stack(&self, count: u32) -> ItemStack {
        ItemStack::new(self.clone(), count)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// A counted stack of one item type.
///
/// The upper bound on `count` is the per-type maximum stack size, which is
/// enforced by container adapters, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemType,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: ItemType, count: u32) -> Self {
        Self { item, count }
    }

    /// Returns true if the stack holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if `other` has the same item type, ignoring counts.
    #[must_use]
    pub fn is_similar(&self, other: &ItemStack) -> bool {
        self.item == other.item
    }

    /// Returns the same item type with a different count.
    #[must_use]
    pub fn with_count(&self, count: u32) -> Self {
        Self {
            item: self.item.clone(),
            count,
        }
    }
}

impl fmt::Display for ItemStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.item, self.count)
    }
}

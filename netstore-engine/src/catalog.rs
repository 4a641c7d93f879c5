//! Cached view of a network's aggregated contents.

use chrono::{DateTime, Utc};
use netstore_types::ItemType;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// One item type and how many the network holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub item: ItemType,
    pub count: u32,
}

/// How a catalog listing is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// By display name, ties broken by kind.
    #[default]
    Alphabetical,
    CountDescending,
    CountAscending,
}

impl SortOrder {
    /// The next order in the cycle a terminal button steps through.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Alphabetical => Self::CountDescending,
            Self::CountDescending => Self::CountAscending,
            Self::CountAscending => Self::Alphabetical,
        }
    }
}

/// Aggregate counts plus slot usage, captured at `built_at`.
///
/// Reflects the containers that were reachable at build time only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    used_slots: u32,
    total_slots: u32,
    built_at: DateTime<Utc>,
}

impl Catalog {
    pub fn new(counts: HashMap<ItemType, u32>, used_slots: u32, total_slots: u32) -> Self {
        let mut entries: Vec<CatalogEntry> = counts
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(item, count)| CatalogEntry { item, count })
            .collect();
        entries.sort_by(alphabetical);
        Self {
            entries,
            used_slots,
            total_slots,
            built_at: Utc::now(),
        }
    }

    /// Entries in alphabetical order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn unique_types(&self) -> usize {
        self.entries.len()
    }

    pub fn total_items(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.count)).sum()
    }

    pub fn count(&self, item: &ItemType) -> u32 {
        self.entries
            .iter()
            .find(|e| e.item == *item)
            .map_or(0, |e| e.count)
    }

    pub fn used_slots(&self) -> u32 {
        self.used_slots
    }

    pub fn total_slots(&self) -> u32 {
        self.total_slots
    }

    /// Used slots as a percentage of total slots; 0 when there are none.
    pub fn capacity_percent(&self) -> f64 {
        percent(self.used_slots, self.total_slots)
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn sorted(&self, order: SortOrder) -> Vec<&CatalogEntry> {
        let mut view: Vec<&CatalogEntry> = self.entries.iter().collect();
        sort_view(&mut view, order);
        view
    }

    /// Case-insensitive substring match on display names, alphabetical.
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        self.view(Some(query), SortOrder::Alphabetical)
    }

    /// Optional filter then sort, as a terminal page would request it.
    pub fn view(&self, query: Option<&str>, order: SortOrder) -> Vec<&CatalogEntry> {
        let needle = query.map(str::trim).filter(|q| !q.is_empty()).map(str::to_lowercase);
        let mut view: Vec<&CatalogEntry> = self
            .entries
            .iter()
            .filter(|e| {
                needle
                    .as_deref()
                    .is_none_or(|n| e.item.display_name().to_lowercase().contains(n))
            })
            .collect();
        sort_view(&mut view, order);
        view
    }
}

pub(crate) fn percent(used: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(used) / f64::from(total) * 100.0
    }
}

fn alphabetical(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    a.item
        .display_name()
        .to_lowercase()
        .cmp(&b.item.display_name().to_lowercase())
        .then_with(|| a.item.kind.cmp(&b.item.kind))
}

fn sort_view(view: &mut [&CatalogEntry], order: SortOrder) {
    match order {
        SortOrder::Alphabetical => view.sort_by(|a, b| alphabetical(a, b)),
        SortOrder::CountDescending => {
            view.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| alphabetical(a, b)));
        }
        SortOrder::CountAscending => {
            view.sort_by(|a, b| a.count.cmp(&b.count).then_with(|| alphabetical(a, b)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        let counts = HashMap::from([
            (ItemType::new("OAK_LOG"), 12),
            (ItemType::new("DIAMOND"), 3),
            (ItemType::new("STONE").with_display_name("Oak Stone"), 40),
            (ItemType::new("DIRT"), 0),
        ]);
        Catalog::new(counts, 4, 27)
    }

    fn names(view: &[&CatalogEntry]) -> Vec<String> {
        view.iter().map(|e| e.item.display_name()).collect()
    }

    #[test]
    fn zero_counts_are_dropped() {
        let catalog = catalog();
        assert_eq!(catalog.unique_types(), 3);
        assert_eq!(catalog.total_items(), 55);
        assert_eq!(catalog.count(&ItemType::new("DIRT")), 0);
    }

    #[test]
    fn sort_orders() {
        let catalog = catalog();
        assert_eq!(
            names(&catalog.sorted(SortOrder::Alphabetical)),
            vec!["diamond", "oak log", "Oak Stone"]
        );
        assert_eq!(
            names(&catalog.sorted(SortOrder::CountDescending)),
            vec!["Oak Stone", "oak log", "diamond"]
        );
        assert_eq!(
            names(&catalog.sorted(SortOrder::CountAscending)),
            vec!["diamond", "oak log", "Oak Stone"]
        );
    }

    #[test]
    fn search_is_case_insensitive() {
        let catalog = catalog();
        assert_eq!(names(&catalog.search("OAK")), vec!["oak log", "Oak Stone"]);
        assert_eq!(catalog.search("  ").len(), 3);
        assert!(catalog.search("emerald").is_empty());
    }

    #[test]
    fn sort_cycle_wraps() {
        let start = SortOrder::default();
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn empty_catalog_reports_zero_capacity() {
        let empty = Catalog::new(HashMap::new(), 0, 0);
        assert_eq!(empty.capacity_percent(), 0.0);
    }
}

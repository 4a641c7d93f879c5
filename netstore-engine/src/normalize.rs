//! Canonical reference normalization.
//!
//! A two-cell unit is identified by the lesser of its two cell locations,
//! so interacting with either half yields the same key.

use crate::container::UnitLayout;
use netstore_types::{CanonicalRef, ContainerRef};

/// Returns the canonical key of the unit containing `at`.
///
/// Idempotent for any symmetric layout.
pub fn normalize(at: &ContainerRef, layout: &dyn UnitLayout) -> CanonicalRef {
    match layout.partner(at) {
        Some(partner) if partner < *at => CanonicalRef::from_normalized(partner),
        _ => CanonicalRef::from_normalized(at.clone()),
    }
}

/// Every key under which one unit might have been registered.
///
/// A cell registered while it was a single container keeps its own location
/// as its key. If a neighbour later joins it into a two-cell unit, the
/// canonical key may shift to the other cell. `UnitKeys` carries those
/// stale per-cell keys alongside the canonical one so membership checks can
/// catch them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitKeys {
    pub canonical: CanonicalRef,
    /// The interacted cell's own key, when it differs from `canonical`.
    pub cell: Option<CanonicalRef>,
    /// The partner cell's own key, when it differs from `canonical`.
    pub partner: Option<CanonicalRef>,
}

impl UnitKeys {
    pub fn resolve(at: &ContainerRef, layout: &dyn UnitLayout) -> Self {
        let canonical = normalize(at, layout);
        let raw = |location: ContainerRef| {
            let key = CanonicalRef::from_normalized(location);
            (key != canonical).then_some(key)
        };
        Self {
            cell: raw(at.clone()),
            partner: layout.partner(at).and_then(raw),
            canonical,
        }
    }

    /// The canonical key followed by any stale cell keys.
    pub fn all(&self) -> impl Iterator<Item = &CanonicalRef> {
        std::iter::once(&self.canonical)
            .chain(self.cell.as_ref())
            .chain(self.partner.as_ref())
    }
}

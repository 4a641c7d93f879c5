//! In-memory container backends.
//!
//! Used by tests and by hosts that want to drive the engine without a real
//! world behind it.

use crate::container::{Container, ContainerSource, DEFAULT_MAX_STACK_SIZE, Presence, UnitLayout};
use crate::normalize::normalize;
use netstore_types::{CanonicalRef, ContainerRef, ItemStack, ItemType};
use std::collections::{HashMap, HashSet};

/// A fixed-size slot array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotContainer {
    slots: Vec<Option<ItemStack>>,
    max_stack: u32,
    item_limits: HashMap<ItemType, u32>,
}

impl SlotContainer {
    /// Creates an empty container with `size` slots and a stack size of 64.
    pub fn new(size: u32) -> Self {
        Self {
            slots: vec![None; size as usize],
            max_stack: DEFAULT_MAX_STACK_SIZE,
            item_limits: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_max_stack_size(mut self, max: u32) -> Self {
        self.max_stack = max;
        self
    }

    /// Overrides the stack size for one item type.
    #[must_use]
    pub fn with_item_limit(mut self, item: ItemType, max: u32) -> Self {
        self.item_limits.insert(item, max);
        self
    }

    /// Fills `index` directly, bypassing stacking rules.
    #[must_use]
    pub fn with_slot(mut self, index: u32, stack: ItemStack) -> Self {
        self.set_slot(index, Some(stack));
        self
    }

    pub fn slot(&self, index: u32) -> Option<&ItemStack> {
        self.slots.get(index as usize).and_then(Option::as_ref)
    }

    pub fn contents(&self) -> &[Option<ItemStack>] {
        &self.slots
    }

    /// Total count of `item` across all slots.
    pub fn count(&self, item: &ItemType) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|s| s.item == *item)
            .fold(0u32, |acc, s| acc.saturating_add(s.count))
    }
}

impl Container for SlotContainer {
    fn size(&self) -> u32 {
        self.slots.len() as u32
    }

    fn slots(&self) -> Vec<Option<ItemStack>> {
        self.slots.clone()
    }

    fn set_slot(&mut self, index: u32, stack: Option<ItemStack>) {
        if let Some(slot) = self.slots.get_mut(index as usize) {
            *slot = stack.filter(|s| !s.is_empty());
        }
    }

    fn max_stack_size(&self, item: &ItemType) -> u32 {
        self.item_limits.get(item).copied().unwrap_or(self.max_stack)
    }
}

/// A world of containers keyed by canonical reference.
///
/// Tracks two-cell units, unloaded regions and destroyed containers so that
/// every [`Presence`] state can be produced.
#[derive(Debug, Default)]
pub struct MemoryWorld {
    containers: HashMap<CanonicalRef, SlotContainer>,
    partners: HashMap<ContainerRef, ContainerRef>,
    unloaded: HashSet<CanonicalRef>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a single-cell container and returns its key.
    pub fn place(&mut self, at: ContainerRef, container: SlotContainer) -> CanonicalRef {
        let key = CanonicalRef::from_normalized(at);
        self.containers.insert(key.clone(), container);
        key
    }

    /// Places a two-cell unit spanning `a` and `b`.
    ///
    /// Any single containers already at either cell are merged away.
    pub fn place_double(
        &mut self,
        a: ContainerRef,
        b: ContainerRef,
        container: SlotContainer,
    ) -> CanonicalRef {
        self.containers.remove(&CanonicalRef::from_normalized(a.clone()));
        self.containers.remove(&CanonicalRef::from_normalized(b.clone()));
        self.partners.insert(a.clone(), b.clone());
        self.partners.insert(b, a.clone());
        let key = normalize(&a, &*self);
        self.containers.insert(key.clone(), container);
        key
    }

    /// Links two cells into one unit without touching contents, as when a
    /// neighbour is placed next to an existing container.
    pub fn join(&mut self, a: ContainerRef, b: ContainerRef) -> CanonicalRef {
        let old_a = CanonicalRef::from_normalized(a.clone());
        let old_b = CanonicalRef::from_normalized(b.clone());
        let carried = self
            .containers
            .remove(&old_a)
            .or_else(|| self.containers.remove(&old_b));
        self.partners.insert(a.clone(), b.clone());
        self.partners.insert(b, a.clone());
        let key = normalize(&a, &*self);
        if let Some(container) = carried {
            self.containers.insert(key.clone(), container);
        }
        key
    }

    /// Maps a key kept from before a [`join`](Self::join) to the unit's
    /// current key. Keys that already name a container pass through.
    fn resolve(&self, at: &CanonicalRef) -> CanonicalRef {
        if self.containers.contains_key(at) {
            return at.clone();
        }
        normalize(at.location(), self)
    }

    /// Destroys the unit stored under `at`. Its members become `Gone`.
    pub fn remove(&mut self, at: &CanonicalRef) -> Option<SlotContainer> {
        let key = self.resolve(at);
        if let Some(partner) = self.partners.remove(key.location()) {
            self.partners.remove(&partner);
        }
        self.unloaded.remove(&key);
        self.containers.remove(&key)
    }

    pub fn unload(&mut self, at: &CanonicalRef) {
        let key = self.resolve(at);
        if self.containers.contains_key(&key) {
            self.unloaded.insert(key);
        }
    }

    pub fn load(&mut self, at: &CanonicalRef) {
        let key = self.resolve(at);
        self.unloaded.remove(&key);
    }

    /// Direct access, ignoring load state.
    pub fn get(&self, at: &CanonicalRef) -> Option<&SlotContainer> {
        self.containers.get(&self.resolve(at))
    }

    pub fn get_mut(&mut self, at: &CanonicalRef) -> Option<&mut SlotContainer> {
        let key = self.resolve(at);
        self.containers.get_mut(&key)
    }
}

impl ContainerSource for MemoryWorld {
    fn container(&self, at: &CanonicalRef) -> Option<&dyn Container> {
        let key = self.resolve(at);
        if self.unloaded.contains(&key) {
            return None;
        }
        self.containers.get(&key).map(|c| c as &dyn Container)
    }

    fn container_mut(&mut self, at: &CanonicalRef) -> Option<&mut dyn Container> {
        let key = self.resolve(at);
        if self.unloaded.contains(&key) {
            return None;
        }
        self.containers.get_mut(&key).map(|c| c as &mut dyn Container)
    }

    fn presence(&self, at: &CanonicalRef) -> Presence {
        let key = self.resolve(at);
        match (self.containers.contains_key(&key), self.unloaded.contains(&key)) {
            (false, _) => Presence::Gone,
            (true, true) => Presence::Unloaded,
            (true, false) => Presence::Loaded,
        }
    }
}

impl UnitLayout for MemoryWorld {
    fn partner(&self, at: &ContainerRef) -> Option<ContainerRef> {
        self.partners.get(at).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stone() -> ItemType {
        ItemType::new("STONE")
    }

    #[test]
    fn insert_fills_partial_stacks_before_empty_slots() {
        let mut chest = SlotContainer::new(3).with_slot(2, stone().stack(60));

        let rest = chest.best_effort_insert(stone().stack(10));

        assert_eq!(rest, None);
        assert_eq!(chest.slot(2).map(|s| s.count), Some(64));
        assert_eq!(chest.slot(0).map(|s| s.count), Some(6));
        assert!(chest.slot(1).is_none());
    }

    #[test]
    fn insert_returns_what_does_not_fit() {
        let mut chest = SlotContainer::new(2);
        let rest = chest.best_effort_insert(stone().stack(200));
        assert_eq!(rest, Some(stone().stack(72)));
        assert_eq!(chest.count(&stone()), 128);
    }

    #[test]
    fn insert_respects_per_item_limits() {
        let pearl = ItemType::new("ENDER_PEARL");
        let mut chest = SlotContainer::new(2).with_item_limit(pearl.clone(), 16);
        let rest = chest.best_effort_insert(pearl.stack(40));
        assert_eq!(rest, Some(pearl.stack(8)));
    }

    #[test]
    fn insert_never_mixes_metadata() {
        let named = stone().with_display_name("Lucky Stone");
        let mut chest = SlotContainer::new(1).with_slot(0, stone().stack(1));
        let rest = chest.best_effort_insert(named.stack(1));
        assert_eq!(rest, Some(named.stack(1)));
    }

    #[test]
    fn empty_slots_normalize_to_none() {
        let mut chest = SlotContainer::new(1);
        chest.set_slot(0, Some(stone().stack(0)));
        assert!(chest.slot(0).is_none());
        assert_eq!(chest.used_slots(), 0);
    }

    #[test]
    fn presence_tracks_load_state_and_removal() {
        let mut world = MemoryWorld::new();
        let key = world.place(ContainerRef::new("w", 0, 0, 0), SlotContainer::new(9));

        assert_eq!(world.presence(&key), Presence::Loaded);
        world.unload(&key);
        assert_eq!(world.presence(&key), Presence::Unloaded);
        assert!(world.container(&key).is_none());
        world.load(&key);
        assert!(world.container(&key).is_some());
        world.remove(&key);
        assert_eq!(world.presence(&key), Presence::Gone);
    }

    #[test]
    fn join_moves_contents_to_the_canonical_key() {
        let mut world = MemoryWorld::new();
        let right = ContainerRef::new("w", 1, 0, 0);
        let left = ContainerRef::new("w", 0, 0, 0);
        world.place(right.clone(), SlotContainer::new(27).with_slot(0, stone().stack(5)));

        let key = world.join(right, left.clone());

        assert_eq!(key.location(), &left);
        assert_eq!(world.get(&key).map(|c| c.count(&stone())), Some(5));
    }

    #[test]
    fn pre_join_key_still_reaches_the_unit() {
        let mut world = MemoryWorld::new();
        let right = ContainerRef::new("w", 1, 0, 0);
        let left = ContainerRef::new("w", 0, 0, 0);
        let old = world.place(right.clone(), SlotContainer::new(27).with_slot(0, stone().stack(5)));

        world.join(right, left);

        assert_eq!(world.presence(&old), Presence::Loaded);
        assert_eq!(world.container(&old).map(|c| c.used_slots()), Some(1));
        world.unload(&old);
        assert_eq!(world.presence(&old), Presence::Unloaded);
        world.load(&old);
        assert!(world.remove(&old).is_some());
        assert_eq!(world.presence(&old), Presence::Gone);
    }
}

//! Container capability interface.
//!
//! The engine never inspects what kind of block or backend a container is.
//! Hosts implement [`Container`] per backend kind and expose live
//! containers through a [`ContainerSource`]. Multi-cell layout is reported
//! separately through [`UnitLayout`] so membership checks can run without
//! touching container contents.

use netstore_types::{CanonicalRef, ContainerRef, ItemStack, ItemType};

/// Stack size used by adapters that have no per-type answer.
pub const DEFAULT_MAX_STACK_SIZE: u32 = 64;

/// A bounded, slot-addressable storage backend.
pub trait Container {
    /// Number of slots.
    fn size(&self) -> u32;

    /// Snapshot of every slot, in slot order. Length equals `size()`.
    fn slots(&self) -> Vec<Option<ItemStack>>;

    /// Overwrites one slot. `None` clears it.
    fn set_slot(&mut self, index: u32, stack: Option<ItemStack>);

    /// Largest count a single slot may hold for `item`.
    fn max_stack_size(&self, item: &ItemType) -> u32;

    /// Number of slots holding a non-empty stack.
    fn used_slots(&self) -> u32 {
        self.slots()
            .iter()
            .filter(|slot| slot.as_ref().is_some_and(|s| !s.is_empty()))
            .count() as u32
    }

    /// Places as much of `stack` as fits and returns what could not be placed.
    ///
    /// Existing partial stacks of the same type are topped up first, in slot
    /// order; only then are empty slots filled, again in slot order. This
    /// decides which slot ends up holding the final partial stack, so
    /// adapters overriding it must keep the same order.
    fn best_effort_insert(&mut self, stack: ItemStack) -> Option<ItemStack> {
        if stack.is_empty() {
            return None;
        }
        let max = self.max_stack_size(&stack.item).max(1);
        let mut remaining = stack.count;
        let slots = self.slots();

        for (index, slot) in slots.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            if let Some(existing) = slot {
                if existing.item == stack.item && !existing.is_empty() && existing.count < max {
                    let added = (max - existing.count).min(remaining);
                    self.set_slot(index as u32, Some(existing.with_count(existing.count + added)));
                    remaining -= added;
                }
            }
        }

        for (index, slot) in slots.iter().enumerate() {
            if remaining == 0 {
                break;
            }
            let free = slot.as_ref().is_none_or(ItemStack::is_empty);
            if free {
                let placed = max.min(remaining);
                self.set_slot(index as u32, Some(stack.with_count(placed)));
                remaining -= placed;
            }
        }

        (remaining > 0).then(|| stack.with_count(remaining))
    }
}

/// Whether a member reference currently resolves to a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Reachable now.
    Loaded,
    /// Temporarily unreachable (e.g. its region is not loaded). Kept.
    Unloaded,
    /// No longer a valid container. Eligible for pruning.
    Gone,
}

/// Resolves canonical references to live containers.
///
/// Returning `None` means "treat as absent for this call"; the engine never
/// raises an error for an unreachable member.
///
/// A key registered for a single cell that has since been joined into a
/// two-cell unit must still resolve to that unit.
pub trait ContainerSource {
    fn container(&self, at: &CanonicalRef) -> Option<&dyn Container>;

    fn container_mut(&mut self, at: &CanonicalRef) -> Option<&mut dyn Container>;

    /// Distinguishes unloaded members from dead ones. The default cannot
    /// tell them apart and never reports `Gone`.
    fn presence(&self, at: &CanonicalRef) -> Presence {
        if self.container(at).is_some() {
            Presence::Loaded
        } else {
            Presence::Unloaded
        }
    }
}

/// Reports which cells form two-cell units.
///
/// Implementations must be symmetric: if `partner(a) == Some(b)` then
/// `partner(b) == Some(a)`.
pub trait UnitLayout {
    fn partner(&self, at: &ContainerRef) -> Option<ContainerRef>;
}

/// Layout in which every container occupies a single cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleCells;

impl UnitLayout for SingleCells {
    fn partner(&self, _at: &ContainerRef) -> Option<ContainerRef> {
        None
    }
}

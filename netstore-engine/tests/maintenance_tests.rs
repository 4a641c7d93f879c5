use netstore_engine::memory::{MemoryWorld, SlotContainer};
use netstore_engine::{DrainReport, Network, SingleCells};
use netstore_types::{CanonicalRef, ContainerRef, ItemType, PlayerId, Role};
use pretty_assertions::assert_eq;

fn at(x: i32) -> ContainerRef {
    ContainerRef::new("world", x, 64, 0)
}

fn cobble() -> ItemType {
    ItemType::new("COBBLESTONE")
}

struct Fixture {
    owner: PlayerId,
    net: Network,
    world: MemoryWorld,
    storage: CanonicalRef,
    feeder: CanonicalRef,
}

fn fixture(storage_slots: u32, feeder: SlotContainer) -> Fixture {
    let owner = PlayerId::random();
    let net = Network::new("Quarry", owner);
    let mut world = MemoryWorld::new();
    world.place(at(0), SlotContainer::new(storage_slots));
    world.place(at(10), feeder);
    let storage = net.add_member(Role::Storage, &at(0), &SingleCells).unwrap();
    let feeder = net.add_member(Role::Feeder, &at(10), &SingleCells).unwrap();
    Fixture {
        owner,
        net,
        world,
        storage,
        feeder,
    }
}

// ── Feeder drain ────────────────────────────────────────────────

#[test]
fn drain_moves_feeder_contents_into_storage() {
    let mut f = fixture(9, SlotContainer::new(9).with_slot(4, cobble().stack(40)));

    let report = f.net.drain_feeders(&mut f.world);

    assert_eq!(report, DrainReport { moved: 40, feeders: 1 });
    assert_eq!(f.world.get(&f.feeder).unwrap().count(&cobble()), 0);
    assert_eq!(f.world.get(&f.storage).unwrap().count(&cobble()), 40);
    assert_eq!(f.net.stat(f.owner).map(|s| s.deposited), Some(40));
}

#[test]
fn drain_leaves_what_storage_cannot_take() {
    let mut f = fixture(
        1,
        SlotContainer::new(2)
            .with_slot(0, cobble().stack(50))
            .with_slot(1, cobble().stack(50)),
    );

    let report = f.net.drain_feeders(&mut f.world);

    assert_eq!(report.moved, 64);
    let feeder = f.world.get(&f.feeder).unwrap();
    assert_eq!(feeder.slot(0), None);
    assert_eq!(feeder.slot(1), Some(&cobble().stack(36)));
}

#[test]
fn drain_skips_unloaded_feeders() {
    let mut f = fixture(9, SlotContainer::new(1).with_slot(0, cobble().stack(3)));
    f.world.unload(&f.feeder);

    assert_eq!(f.net.drain_feeders(&mut f.world), DrainReport::default());
    assert_eq!(f.net.stat(f.owner), None);
}

#[test]
fn global_network_drains_without_crediting_anyone() {
    let net = Network::global("global");
    let mut world = MemoryWorld::new();
    world.place(at(0), SlotContainer::new(9));
    world.place(at(10), SlotContainer::new(1).with_slot(0, cobble().stack(3)));
    net.add_member(Role::Storage, &at(0), &SingleCells).unwrap();
    net.add_member(Role::Feeder, &at(10), &SingleCells).unwrap();

    assert_eq!(net.drain_feeders(&mut world).moved, 3);
    assert!(net.stats().is_empty());
}

// ── Pruning ─────────────────────────────────────────────────────

#[test]
fn prune_drops_gone_members_only() {
    let mut f = fixture(9, SlotContainer::new(9));
    world_add_terminal(&mut f);
    let terminal = f.net.members(Role::Terminal)[0].clone();

    f.world.remove(&f.storage);
    f.world.unload(&f.feeder);

    let pruned = f.net.prune(&f.world);

    assert_eq!(pruned, vec![f.storage.clone()]);
    assert!(f.net.members(Role::Storage).is_empty());
    assert_eq!(f.net.members(Role::Feeder), vec![f.feeder.clone()]);
    assert_eq!(f.net.members(Role::Terminal), vec![terminal]);
}

fn world_add_terminal(f: &mut Fixture) {
    f.world.place(at(20), SlotContainer::new(1));
    f.net.add_member(Role::Terminal, &at(20), &SingleCells).unwrap();
}

#[test]
fn prune_marks_dirty_only_when_something_changed() {
    let f = fixture(9, SlotContainer::new(9));
    f.net.take_dirty();

    assert!(f.net.prune(&f.world).is_empty());
    assert!(!f.net.is_dirty());
}

// ── Joined units ────────────────────────────────────────────────

#[test]
fn member_survives_a_neighbour_joining_it() {
    let net = Network::new("Vault", PlayerId::random());
    let mut world = MemoryWorld::new();
    world.place(at(1), SlotContainer::new(27).with_slot(0, cobble().stack(10)));
    let old = net.add_member(Role::Storage, &at(1), &SingleCells).unwrap();

    let unit = world.join(at(1), at(0));
    assert_ne!(unit, old);

    assert_eq!(net.item_count(&world, &cobble()), 10);
    assert_eq!(net.role_of(&at(0), &world), Some(Role::Storage));
    assert_eq!(net.deposit(&mut world, cobble().stack(5)), None);
    assert_eq!(net.item_count(&world, &cobble()), 15);
    assert!(net.prune(&world).is_empty());
    assert_eq!(net.members(Role::Storage), vec![old]);
}

#[test]
fn rekey_moves_stale_members_onto_the_unit_key() {
    let net = Network::new("Vault", PlayerId::random());
    let mut world = MemoryWorld::new();
    world.place(at(1), SlotContainer::new(27).with_slot(0, cobble().stack(10)));
    net.add_member(Role::Storage, &at(1), &SingleCells).unwrap();
    let unit = world.join(at(1), at(0));
    net.take_dirty();

    assert_eq!(net.rekey_members(&world), vec![unit.clone()]);
    assert!(net.is_dirty());
    assert_eq!(net.members(Role::Storage), vec![unit]);
    assert_eq!(net.item_count(&world, &cobble()), 10);
    assert_eq!(net.role_of(&at(1), &world), Some(Role::Storage));

    net.take_dirty();
    assert!(net.rekey_members(&world).is_empty());
    assert!(!net.is_dirty());
}

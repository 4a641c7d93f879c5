use netstore_engine::memory::{MemoryWorld, SlotContainer};
use netstore_engine::{
    ErrorKind, Limits, MembershipIndex, Network, NetworkError, SingleCells,
};
use netstore_types::{ContainerRef, NetworkId, PlayerId, Role};
use std::sync::Arc;

fn at(x: i32) -> ContainerRef {
    ContainerRef::new("world", x, 64, 0)
}

fn shared_pair(limits: Limits) -> (Network, Network) {
    let index = Arc::new(MembershipIndex::new());
    let a = Network::with_index(NetworkId::new(), "A", Some(PlayerId::random()), Arc::clone(&index), limits);
    let b = Network::with_index(NetworkId::new(), "B", Some(PlayerId::random()), index, limits);
    (a, b)
}

// ── Exclusivity ─────────────────────────────────────────────────

#[test]
fn second_add_in_any_role_fails() {
    let net = Network::new("Base", PlayerId::random());
    net.add_member(Role::Storage, &at(0), &SingleCells).unwrap();

    for role in Role::ALL {
        let err = net.add_member(role, &at(0), &SingleCells).unwrap_err();
        assert!(matches!(err, NetworkError::AlreadyMember { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

#[test]
fn networks_sharing_an_index_cannot_share_members() {
    let (a, b) = shared_pair(Limits::default());
    a.add_member(Role::Storage, &at(0), &SingleCells).unwrap();

    let err = b.add_member(Role::Feeder, &at(0), &SingleCells).unwrap_err();

    assert_eq!(
        err,
        NetworkError::AlreadyMember {
            at: netstore_engine::normalize(&at(0), &SingleCells),
            network: a.id(),
            role: Role::Storage,
        }
    );
    assert_eq!(b.member_count(Role::Feeder), 0);
}

#[test]
fn removing_from_the_wrong_network_does_nothing() {
    let (a, b) = shared_pair(Limits::default());
    a.add_member(Role::Storage, &at(0), &SingleCells).unwrap();

    assert_eq!(b.remove_member(&at(0), &SingleCells), None);
    assert_eq!(a.role_of(&at(0), &SingleCells), Some(Role::Storage));
}

// ── Two-cell units ──────────────────────────────────────────────

#[test]
fn either_half_of_a_double_resolves_to_one_member() {
    let net = Network::new("Base", PlayerId::random());
    let mut world = MemoryWorld::new();
    world.place_double(at(0), at(1), SlotContainer::new(54));

    let key = net.add_member(Role::Storage, &at(1), &world).unwrap();

    assert_eq!(key.location(), &at(0));
    assert!(net.add_member(Role::Storage, &at(0), &world).is_err());
    assert_eq!(net.role_of(&at(1), &world), Some(Role::Storage));
    assert_eq!(net.remove_member(&at(0), &world), Some(Role::Storage));
    assert_eq!(net.member_count(Role::Storage), 0);
}

#[test]
fn joining_a_registered_single_blocks_the_new_half() {
    let net = Network::new("Base", PlayerId::random());
    let mut world = MemoryWorld::new();
    world.place(at(1), SlotContainer::new(27));
    net.add_member(Role::Storage, &at(1), &world).unwrap();

    // A neighbour at x=0 now forms a unit keyed by the new cell.
    world.join(at(1), at(0));

    let err = net.add_member(Role::Storage, &at(0), &world).unwrap_err();
    assert!(matches!(err, NetworkError::PartnerAlreadyMember { .. }));
}

#[test]
fn stale_single_key_still_counts_as_the_same_unit() {
    let net = Network::new("Base", PlayerId::random());
    let mut world = MemoryWorld::new();
    world.place(at(1), SlotContainer::new(27));
    net.add_member(Role::Storage, &at(1), &world).unwrap();
    world.join(at(1), at(0));

    let err = net.add_member(Role::Terminal, &at(1), &world).unwrap_err();
    assert!(matches!(err, NetworkError::AlreadyMember { .. }));
    assert_eq!(net.remove_member(&at(1), &world), Some(Role::Storage));
}

// ── Limits ──────────────────────────────────────────────────────

#[test]
fn limit_rejects_at_capacity_and_frees_on_removal() {
    let limits = Limits {
        storage: 2,
        terminals: 1,
        feeders: 1,
    };
    let (a, _) = shared_pair(limits);
    a.add_member(Role::Storage, &at(0), &SingleCells).unwrap();
    a.add_member(Role::Storage, &at(2), &SingleCells).unwrap();

    let err = a.add_member(Role::Storage, &at(4), &SingleCells).unwrap_err();
    assert_eq!(
        err,
        NetworkError::LimitExceeded {
            role: Role::Storage,
            limit: 2
        }
    );

    a.remove_member(&at(0), &SingleCells);
    a.add_member(Role::Storage, &at(4), &SingleCells).unwrap();
}

#[test]
fn limits_apply_per_network() {
    let limits = Limits {
        storage: 1,
        terminals: 1,
        feeders: 1,
    };
    let (a, b) = shared_pair(limits);
    a.add_member(Role::Terminal, &at(0), &SingleCells).unwrap();
    b.add_member(Role::Terminal, &at(2), &SingleCells).unwrap();
}

#[test]
fn members_are_listed_in_reference_order() {
    let net = Network::new("Base", PlayerId::random());
    for x in [5, 1, 3] {
        net.add_member(Role::Storage, &at(x), &SingleCells).unwrap();
    }
    let xs: Vec<i32> = net
        .members(Role::Storage)
        .iter()
        .map(|r| r.location().x)
        .collect();
    assert_eq!(xs, vec![1, 3, 5]);
}

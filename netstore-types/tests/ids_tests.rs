use netstore_types::{Error, NetworkId, PlayerId};
use std::collections::HashSet;
use std::str::FromStr;

// ── PlayerId ──────────────────────────────────────────────────────

#[test]
fn player_id_from_uuid_roundtrip() {
    let uuid = uuid::Uuid::new_v4();
    let id = PlayerId::from_uuid(uuid);
    assert_eq!(id.as_uuid(), uuid);
}

#[test]
fn player_id_display_and_parse() {
    let id = PlayerId::random();
    let parsed = PlayerId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn player_id_from_str_invalid() {
    assert!(matches!(PlayerId::from_str("steve"), Err(Error::InvalidUuid(_))));
}

#[test]
fn player_id_accepts_bare_hex_and_padding() {
    let id = PlayerId::random();
    let bare = id.as_uuid().simple().to_string();
    assert_eq!(PlayerId::parse(&bare).unwrap(), id);
    assert_eq!(PlayerId::parse(&format!("  {id}\n")).unwrap(), id);
}

#[test]
fn player_id_serializes_as_plain_string() {
    let id = PlayerId::random();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
    let back: PlayerId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

// ── NetworkId ─────────────────────────────────────────────────────

#[test]
fn network_id_new_is_unique() {
    let a = NetworkId::new();
    let b = NetworkId::new();
    assert_ne!(a, b);
}

#[test]
fn network_id_default_is_unique() {
    assert_ne!(NetworkId::default(), NetworkId::default());
}

#[test]
fn network_id_display_and_parse() {
    let id = NetworkId::new();
    let parsed: NetworkId = NetworkId::from_str(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn network_id_parse_invalid() {
    assert!(NetworkId::parse("not-a-uuid").is_err());
}

#[test]
fn network_id_hash_and_eq() {
    let id = NetworkId::new();
    let mut set = HashSet::new();
    set.insert(id);
    set.insert(id);
    assert_eq!(set.len(), 1);
}

#[test]
fn network_ids_are_time_ordered() {
    let first = NetworkId::new();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = NetworkId::new();
    assert!(first < second);
}

#[test]
fn network_id_carries_its_creation_time() {
    let before = chrono::Utc::now() - chrono::Duration::seconds(1);
    let created = NetworkId::new().created_at().unwrap();
    assert!(created >= before);
    assert!(created <= chrono::Utc::now() + chrono::Duration::seconds(1));
}

#[test]
fn random_network_id_has_no_creation_time() {
    let legacy = NetworkId::from_uuid(uuid::Uuid::new_v4());
    assert_eq!(legacy.created_at(), None);
}

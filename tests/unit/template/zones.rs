use super::*;
use crate::template::model::{ImageZone, ZonePosition};

fn image(x: i32) -> Zone {
    Zone::Image(ImageZone {
        position: ZonePosition::new(x, 0, 10, 10),
        mapping: Default::default(),
    })
}

#[test]
fn insert_keeps_order_and_rejects_duplicates() {
    let mut m = ZoneMap::new();
    m.insert("b", image(1)).unwrap();
    m.insert("a", image(2)).unwrap();
    assert!(m.insert("b", image(3)).is_err());
    assert_eq!(m.names().collect::<Vec<_>>(), ["b", "a"]);
    assert_eq!(m.get("b").unwrap().position().x, 1);
}

#[test]
fn upsert_replaces_in_place() {
    let mut m = ZoneMap::new();
    m.insert("a", image(1)).unwrap();
    m.insert("b", image(2)).unwrap();
    let prev = m.upsert("a", image(9));
    assert_eq!(prev.unwrap().position().x, 1);
    assert_eq!(m.names().collect::<Vec<_>>(), ["a", "b"]);
    assert!(m.upsert("c", image(3)).is_none());
    assert_eq!(m.len(), 3);
}

#[test]
fn remove_returns_zone() {
    let mut m = ZoneMap::new();
    m.insert("a", image(1)).unwrap();
    assert!(m.remove("missing").is_none());
    assert!(m.remove("a").is_some());
    assert!(m.is_empty());
}

#[test]
fn duplicate_keys_in_json_are_rejected() {
    let json = r#"{
        "a": {"type":"image","position":{"x":0,"y":0,"width":1,"height":1}},
        "a": {"type":"image","position":{"x":5,"y":0,"width":1,"height":1}}
    }"#;
    let err = serde_json::from_str::<ZoneMap>(json).unwrap_err().to_string();
    assert!(err.contains("duplicate zone name 'a'"), "{err}");
}

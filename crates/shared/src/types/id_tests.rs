use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_creation() {
    let id = VoucherId::new();
    assert!(!id.to_string().is_empty());
}

#[test]
fn test_typed_id_from_uuid() {
    let uuid = Uuid::new_v4();
    let id = VoucherId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_typed_id_default() {
    let id = VoucherId::default();
    assert!(!id.to_string().is_empty());
}

#[test]
fn test_typed_id_display() {
    let uuid = Uuid::new_v4();
    let id = VoucherId::from_uuid(uuid);
    assert_eq!(format!("{}", id), uuid.to_string());
}

#[test]
fn test_typed_id_from_str() {
    let uuid = Uuid::new_v4();
    let id = VoucherId::from_str(&uuid.to_string()).unwrap();
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_typed_id_from_str_error() {
    assert!(VoucherId::from_str("invalid").is_err());
}

#[test]
fn test_distinct_typed_ids_do_not_mix_at_compile_time() {
    // ArItemId and ApItemId wrap the same Uuid value independently; this is
    // a compile-time property, exercised here only by constructing both.
    let uuid = Uuid::new_v4();
    let ar = ArItemId::from_uuid(uuid);
    let ap = ApItemId::from_uuid(uuid);
    assert_eq!(ar.into_inner(), ap.into_inner());
}

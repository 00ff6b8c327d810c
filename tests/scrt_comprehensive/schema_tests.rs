//! Schema model: fingerprints, Ref resolution and defaults.

use crate::common::*;
use scrt::{DefaultValue, Document, Field, FieldKind, Schema, ScrtError};
use std::sync::Arc;
use std::thread;

fn user(fields: Vec<Field>) -> Schema {
    Schema::new("User", fields)
}

#[test]
fn test_fingerprint_is_stable() {
    let schema = message_schema();
    let first = schema.fingerprint();
    assert_eq!(schema.fingerprint(), first);
    assert_eq!(message_schema().fingerprint(), first);
}

#[test]
fn test_fingerprint_ignores_attribute_order() {
    let a = user(vec![Field::new("ID", FieldKind::Uint64)
        .with_attribute("primary")
        .with_attribute("indexed")]);
    let b = user(vec![Field::new("ID", FieldKind::Uint64)
        .with_attribute("indexed")
        .with_attribute("primary")]);
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn test_fingerprint_tracks_every_field_property() {
    let base = user(vec![Field::new("ID", FieldKind::Uint64)]).fingerprint();
    let variants = [
        user(vec![Field::new("Id", FieldKind::Uint64)]),
        user(vec![Field::new("ID", FieldKind::Int64)]),
        user(vec![Field::new("ID", FieldKind::Uint64).auto_increment()]),
        user(vec![Field::new("ID", FieldKind::Uint64).with_attribute("primary")]),
        user(vec![Field::new("ID", FieldKind::Uint64).with_default(DefaultValue::Uint(1))]),
        user(vec![Field::new("ID", FieldKind::Uint64).with_default_literal("1")]),
        user(vec![Field::reference("ID", "Account", "ID")]),
        Schema::new("Account", vec![Field::new("ID", FieldKind::Uint64)]),
    ];
    for (i, variant) in variants.iter().enumerate() {
        assert_ne!(variant.fingerprint(), base, "variant {}", i);
    }
    assert_ne!(
        user(vec![Field::reference("ID", "Account", "ID")]).fingerprint(),
        user(vec![Field::reference("ID", "Account", "Key")]).fingerprint()
    );
}

#[test]
fn test_fingerprint_concurrent_first_use() {
    let schema = Arc::new(message_schema());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let schema = Arc::clone(&schema);
            thread::spawn(move || schema.fingerprint())
        })
        .collect();
    let prints: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(prints.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_ref_resolves_to_target_kind() {
    let doc = chat_document();
    let message = doc.schema("Message").unwrap();
    let user_ref = message.field_by_name("User").unwrap();
    assert_eq!(user_ref.kind(), FieldKind::Ref);
    assert_eq!(user_ref.value_kind(), Some(FieldKind::Uint64));
    assert_eq!(
        doc.resolve_field_kind(&message, 1).unwrap(),
        FieldKind::Uint64
    );
}

#[test]
fn test_cycle_is_rejected() {
    let mut doc = Document::new();
    doc.add(Schema::new("A", vec![Field::reference("b", "B", "a")]))
        .unwrap();
    doc.add(Schema::new("B", vec![Field::reference("a", "A", "b")]))
        .unwrap();
    let err = doc.finalize().unwrap_err();
    assert!(matches!(err, ScrtError::CircularReference(_)));
    // Nothing was committed.
    assert!(!doc.get("A").unwrap().is_resolved());
}

#[test]
fn test_unknown_targets() {
    let mut doc = Document::new();
    doc.add(message_schema()).unwrap();
    assert!(matches!(
        doc.finalize(),
        Err(ScrtError::UnknownSchema(ref name)) if name == "User"
    ));

    let mut doc = Document::new();
    doc.add(user(vec![Field::new("Key", FieldKind::Uint64)])).unwrap();
    doc.add(message_schema()).unwrap();
    assert!(matches!(
        doc.finalize(),
        Err(ScrtError::UnknownField { .. })
    ));
}

#[test]
fn test_deferred_literals_follow_resolved_kind() {
    let mut doc = Document::new();
    doc.add(Schema::new(
        "Clock",
        vec![
            Field::new("Day", FieldKind::Date),
            Field::new("At", FieldKind::TimestampTZ),
            Field::new("Every", FieldKind::Duration),
        ],
    ))
    .unwrap();
    doc.add(Schema::new(
        "Alarm",
        vec![
            Field::reference("Day", "Clock", "Day").with_default_literal("1970-01-02"),
            Field::reference("At", "Clock", "At").with_default_literal("2024-05-01T08:00:00+02:00"),
            Field::reference("Every", "Clock", "Every").with_default_literal("1h30m"),
        ],
    ))
    .unwrap();
    doc.finalize().unwrap();

    let alarm = doc.schema("Alarm").unwrap();
    assert_eq!(
        alarm.fields()[0].default_value(),
        Some(&DefaultValue::Int(86_400_000_000_000))
    );
    assert_eq!(
        alarm.fields()[1].default_value(),
        Some(&DefaultValue::Str("2024-05-01T08:00:00+02:00".into()))
    );
    assert_eq!(
        alarm.fields()[2].default_value(),
        Some(&DefaultValue::Int(5_400_000_000_000))
    );
}

#[test]
fn test_invalid_literal_is_reported_with_field() {
    let schema = Schema::new(
        "Bad",
        vec![Field::new("Count", FieldKind::Uint64).with_default_literal("-3")],
    );
    match schema.finalize() {
        Err(ScrtError::InvalidDefaultLiteral { field, literal, kind }) => {
            assert_eq!(field, "Bad.Count");
            assert_eq!(literal, "-3");
            assert_eq!(kind, FieldKind::Uint64);
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_duplicate_schema() {
    let mut doc = Document::new();
    doc.add(message_schema()).unwrap();
    assert!(matches!(
        doc.add(message_schema()),
        Err(ScrtError::DuplicateSchema(_))
    ));
}

#[test]
fn test_schema_loaded_from_json_keeps_fingerprint() {
    let json = serde_json::to_string(&message_schema()).unwrap();
    let loaded: Schema = serde_json::from_str(&json).unwrap();
    assert!(!loaded.is_resolved());
    assert_eq!(loaded.fingerprint(), message_schema().fingerprint());

    let doc = Document::new()
        .with_schema(user(vec![Field::new("ID", FieldKind::Uint64).auto_increment()]))
        .unwrap()
        .with_schema(loaded)
        .unwrap();
    doc.finalize().unwrap();
    let message = doc.schema("Message").unwrap();
    assert_eq!(message.value_kind(1), Some(FieldKind::Uint64));
    assert_eq!(message.fingerprint(), crate::common::message().fingerprint());
}

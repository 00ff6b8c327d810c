//! Codec behaviour through the stream API.

use crate::common::*;
use scrt::column::{ColumnEncoder, DecodedValues, IntEncoder, StringEncoder, UintEncoder};
use scrt::varint::ByteCursor;
use scrt::{
    CodecConfig, DefaultValue, Field, FieldKind, Reader, Row, Schema, ScrtError, Value, ValueRef,
    Writer,
};
use std::sync::Arc;

fn single(kind: FieldKind) -> Arc<Schema> {
    let schema = Schema::new("Single", vec![Field::new("V", kind)]);
    schema.finalize().unwrap();
    Arc::new(schema)
}

fn round_trip_column(kind: FieldKind, values: Vec<Value>) {
    let schema = single(kind);
    let rows: Vec<Row> = values
        .iter()
        .map(|v| row_of(&schema, vec![Some(v.clone())]))
        .collect();
    let bytes = encode(&schema, CodecConfig::default(), &rows);
    let decoded = decode(&schema, CodecConfig::default(), &bytes);
    let got: Vec<Value> = decoded.into_iter().map(|r| r[0].clone().unwrap()).collect();
    assert_eq!(got, values);
}

#[test]
fn test_monotonic_uint_column() {
    round_trip_column(
        FieldKind::Uint64,
        [5u64, 5, 7, 1_000_000].iter().map(|&v| Value::Uint(v)).collect(),
    );

    let mut enc = UintEncoder::new();
    for v in [5u64, 5, 7, 1_000_000] {
        enc.append(v);
    }
    assert!(enc.is_monotonic());
}

#[test]
fn test_negative_int_deltas() {
    round_trip_column(
        FieldKind::Int64,
        [-100i64, 50, -25].iter().map(|&v| Value::Int(v)).collect(),
    );

    let mut enc = IntEncoder::new();
    for v in [-100i64, 50, -25] {
        enc.append(v);
    }
    let mut buf = Vec::new();
    enc.encode(&mut buf);
    assert_eq!(buf[0], (3 << 1) | 1);
}

#[test]
fn test_string_dictionary_has_two_entries() {
    let langs = ["en", "en", "es", "en"];
    round_trip_column(
        FieldKind::String,
        langs.iter().map(|&s| Value::Str(s.into())).collect(),
    );

    let mut enc = StringEncoder::new();
    for s in langs {
        enc.append(s).unwrap();
    }
    assert_eq!(enc.dictionary_len(), 2);
    let mut buf = Vec::new();
    enc.encode(&mut buf);
    let mut decoded = DecodedValues::for_type(scrt::ColumnType::Str);
    decoded.decode(&mut ByteCursor::new(&buf)).unwrap();
    match &decoded {
        DecodedValues::Str { dictionary, .. } => assert_eq!(dictionary.len(), 2),
        other => panic!("unexpected {:?}", other),
    }
    let got: Vec<&str> = (0..4)
        .map(|i| decoded.get(&buf, i).unwrap().as_str().unwrap())
        .collect();
    assert_eq!(got, langs);
}

#[test]
fn test_other_kinds_round_trip() {
    round_trip_column(
        FieldKind::Float64,
        vec![Value::Float(0.1), Value::Float(-2.5e300), Value::Float(0.0)],
    );
    round_trip_column(
        FieldKind::Bool,
        vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)],
    );
    round_trip_column(
        FieldKind::Bytes,
        vec![Value::Bytes(vec![]), Value::Bytes(vec![0, 1, 2, 255])],
    );
    round_trip_column(
        FieldKind::DateTime,
        vec![Value::Int(i64::MIN), Value::Int(i64::MAX), Value::Int(0)],
    );
    round_trip_column(
        FieldKind::TimestampTZ,
        vec![Value::Str("2024-05-01T08:00:00+02:00".into())],
    );
}

#[test]
fn test_page_boundaries() {
    let schema = message();
    let config = CodecConfig::for_testing().with_page_rows(4);
    let rows: Vec<Row> = (0..10u64)
        .map(|i| {
            row_of(
                &schema,
                vec![
                    Some(Value::Uint(i)),
                    Some(Value::Uint(1000 + i % 3)),
                    Some(Value::Str(format!("msg {}", i))),
                    Some(Value::Str("en".into())),
                ],
            )
        })
        .collect();
    let bytes = encode(&schema, config.clone(), &rows);
    // 2.5 x row limit
    assert_eq!(count_pages(&bytes), 3);

    let decoded = decode(&schema, config, &bytes);
    assert_eq!(decoded.len(), 10);
    for (i, row) in decoded.iter().enumerate() {
        assert_eq!(row[0], Some(Value::Uint(i as u64)));
        assert_eq!(row[2], Some(Value::Str(format!("msg {}", i))));
    }
}

#[test]
fn test_message_scenario() {
    let schema = message();
    let config = CodecConfig::default().with_page_rows(2);
    let rows = vec![
        row_of(
            &schema,
            vec![
                Some(Value::Uint(1)),
                Some(Value::Uint(1001)),
                Some(Value::Str("Hello World!".into())),
                Some(Value::Str("en".into())),
            ],
        ),
        row_of(
            &schema,
            vec![
                Some(Value::Uint(2)),
                Some(Value::Uint(1002)),
                Some(Value::Str("Bye World!".into())),
                Some(Value::Str("en".into())),
            ],
        ),
    ];
    let bytes = encode(&schema, config.clone(), &rows);
    assert_eq!(count_pages(&bytes), 1);

    let mut reader = Reader::new(bytes.as_slice(), Arc::clone(&schema), config).unwrap();
    let mut row = Row::new(schema);
    assert!(reader.read_row(&mut row).unwrap());
    assert_eq!(row.get_by_name("MsgID"), Some(&Value::Uint(1)));
    assert_eq!(row.get_by_name("User"), Some(&Value::Uint(1001)));
    assert_eq!(row.get_by_name("Text"), Some(&Value::Str("Hello World!".into())));
    assert_eq!(row.get_by_name("Lang"), Some(&Value::Str("en".into())));
}

#[test]
fn test_ref_field_rejects_wrong_value_kind() {
    let schema = message();
    let mut row = Row::new(schema);
    assert!(matches!(
        row.set_by_name("User", "not a number"),
        Err(ScrtError::KindMismatch { .. })
    ));
}

#[test]
fn test_fingerprint_mismatch_never_decodes() {
    let message = message();
    let bytes = encode(
        &message,
        CodecConfig::default(),
        &[row_of(&message, vec![Some(Value::Uint(1)), None, None, None])],
    );

    // Same shape, different name.
    let other = Schema::new(
        "Post",
        vec![
            Field::new("MsgID", FieldKind::Uint64).auto_increment(),
            Field::new("User", FieldKind::Uint64),
            Field::new("Text", FieldKind::String),
            Field::new("Lang", FieldKind::String),
        ],
    );
    other.finalize().unwrap();
    let err = Reader::new(bytes.as_slice(), Arc::new(other), CodecConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, ScrtError::SchemaFingerprintMismatch { .. }));
}

#[test]
fn test_defaults_are_substituted_on_both_sides() {
    let schema = Schema::new(
        "Profile",
        vec![
            Field::new("ID", FieldKind::Uint64),
            Field::new("Lang", FieldKind::String).with_default(DefaultValue::Str("en".into())),
            Field::new("Score", FieldKind::Int64),
        ],
    );
    schema.finalize().unwrap();
    let schema = Arc::new(schema);
    let bytes = encode(
        &schema,
        CodecConfig::default(),
        &[row_of(&schema, vec![Some(Value::Uint(1)), None, None])],
    );
    let decoded = decode(&schema, CodecConfig::default(), &bytes);
    assert_eq!(
        decoded[0],
        vec![Some(Value::Uint(1)), Some(Value::Str("en".into())), None]
    );
}

#[test]
fn test_zero_copy_view_is_tied_to_page() {
    let schema = single(FieldKind::String);
    let rows: Vec<Row> = ["first", "second"]
        .iter()
        .map(|s| row_of(&schema, vec![Some(Value::Str(s.to_string()))]))
        .collect();
    let config = CodecConfig::default().with_page_rows(1);
    let bytes = encode(&schema, config.clone(), &rows);
    let mut reader = Reader::new(bytes.as_slice(), schema, config).unwrap();

    // The borrow checker ends `first` before the next page can load, so the
    // value is copied out to keep it.
    let first: String = {
        let view = reader.read_row_view().unwrap().unwrap();
        match view.get(0).unwrap() {
            Some(ValueRef::Str(s)) => s.to_string(),
            other => panic!("unexpected {:?}", other),
        }
    };
    let view = reader.read_row_view().unwrap().unwrap();
    assert_eq!(view.get(0).unwrap(), Some(ValueRef::Str("second")));
    assert_eq!(first, "first");
}

#[test]
fn test_empty_stream() {
    let schema = message();
    let mut writer = Writer::new(Vec::new(), Arc::clone(&schema), CodecConfig::default()).unwrap();
    writer.close().unwrap();
    let bytes = writer.into_inner().unwrap();
    assert_eq!(bytes.len(), scrt::STREAM_HEADER_SIZE + 1);
    assert!(decode(&schema, CodecConfig::default(), &bytes).is_empty());
}

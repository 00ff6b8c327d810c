//! Shared helpers for the comprehensive suite.

#![allow(dead_code)]

use scrt::{
    CodecConfig, Document, Field, FieldKind, Reader, Row, Schema, Value, Writer,
};
use std::sync::{Arc, Once};

static INIT_TRACING: Once = Once::new();

/// Install a test-writer subscriber once per process.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
            .try_init();
    });
}

/// `User{ID uint64 auto_increment, Name string}` and
/// `Message{MsgID uint64 auto_increment, User ref:User.ID, Text string, Lang string}`,
/// finalized together.
pub fn chat_document() -> Document {
    let mut doc = Document::new();
    doc.add(Schema::new(
        "User",
        vec![
            Field::new("ID", FieldKind::Uint64).auto_increment(),
            Field::new("Name", FieldKind::String),
        ],
    ))
    .unwrap();
    doc.add(message_schema()).unwrap();
    doc.finalize().unwrap();
    doc
}

/// The unresolved Message schema.
pub fn message_schema() -> Schema {
    Schema::new(
        "Message",
        vec![
            Field::new("MsgID", FieldKind::Uint64).auto_increment(),
            Field::reference("User", "User", "ID"),
            Field::new("Text", FieldKind::String),
            Field::new("Lang", FieldKind::String),
        ],
    )
}

/// Finalized Message schema.
pub fn message() -> Arc<Schema> {
    chat_document().schema("Message").unwrap()
}

/// Build a row from optional values in field order.
pub fn row_of(schema: &Arc<Schema>, values: Vec<Option<Value>>) -> Row {
    let mut row = Row::new(Arc::clone(schema));
    for (i, value) in values.into_iter().enumerate() {
        if let Some(value) = value {
            row.set(i, value).unwrap();
        }
    }
    row
}

/// Snapshot of a row's slots.
pub fn values(row: &Row) -> Vec<Option<Value>> {
    (0..row.len()).map(|i| row.get(i).cloned()).collect()
}

/// Encode `rows` into an in-memory stream.
pub fn encode(schema: &Arc<Schema>, config: CodecConfig, rows: &[Row]) -> Vec<u8> {
    let mut writer = Writer::new(Vec::new(), Arc::clone(schema), config).unwrap();
    for row in rows {
        writer.write_row(row).unwrap();
    }
    writer.into_inner().unwrap()
}

/// Decode every row of a stream.
pub fn decode(schema: &Arc<Schema>, config: CodecConfig, bytes: &[u8]) -> Vec<Vec<Option<Value>>> {
    let mut reader = Reader::new(bytes, Arc::clone(schema), config).unwrap();
    let mut row = Row::new(Arc::clone(schema));
    let mut out = Vec::new();
    while reader.read_row(&mut row).unwrap() {
        out.push(values(&row));
    }
    out
}

/// Count page frames in a stream by walking the length prefixes.
pub fn count_pages(bytes: &[u8]) -> usize {
    let mut pos = scrt::STREAM_HEADER_SIZE;
    let mut pages = 0;
    while pos < bytes.len() {
        let (len, n) = scrt::varint::decode_uvarint(&bytes[pos..]).unwrap();
        pos += n;
        if len == 0 {
            break;
        }
        pos += len as usize;
        pages += 1;
    }
    pages
}

//! Stream-level behaviour: files, pooling, bindings and counters.

use crate::common::*;
use scrt::{
    Accessor, BuilderPool, CodecConfig, Reader, RecordBinding, Row, Schema, ScrtError, Value,
    Writer,
};
use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[derive(Debug, Default, Clone, PartialEq)]
struct Message {
    id: u64,
    user: u64,
    text: String,
    lang: Option<String>,
}

fn message_binding(schema: Arc<Schema>) -> RecordBinding<Message> {
    RecordBinding::new(
        schema,
        [
            (
                "MsgID",
                Accessor::new(
                    |m: &Message| Some(Value::Uint(m.id)),
                    |m, v| m.id = v.as_uint().unwrap_or_default(),
                ),
            ),
            (
                "User",
                Accessor::new(
                    |m: &Message| Some(Value::Uint(m.user)),
                    |m, v| m.user = v.as_uint().unwrap_or_default(),
                ),
            ),
            (
                "Text",
                Accessor::new(
                    |m: &Message| Some(Value::Str(m.text.clone())),
                    |m, v| m.text = v.as_str().unwrap_or_default().to_string(),
                ),
            ),
            (
                "Lang",
                Accessor::new(
                    |m: &Message| m.lang.clone().map(Value::Str),
                    |m, v| m.lang = v.as_str().map(str::to_string),
                ),
            ),
        ],
    )
    .unwrap()
}

fn sample(i: u64) -> Message {
    Message {
        id: i,
        user: 1000 + i % 7,
        text: format!("message number {}", i),
        lang: if i % 4 == 0 { None } else { Some("en".into()) },
    }
}

#[test]
fn test_file_round_trip_with_bindings() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("messages.scrt");
    let schema = message();
    let binding = message_binding(Arc::clone(&schema));
    let config = CodecConfig::new().with_page_rows(16);

    let file = BufWriter::new(File::create(&path).unwrap());
    let mut writer = Writer::new(file, Arc::clone(&schema), config.clone()).unwrap();
    for i in 0..100 {
        writer.write_record(&binding, &sample(i)).unwrap();
    }
    writer.close().unwrap();
    let written = writer.stats();
    assert_eq!(written.rows, 100);
    assert_eq!(written.pages, 7);
    drop(writer);

    let file = File::open(&path).unwrap();
    assert_eq!(file.metadata().unwrap().len(), written.bytes);
    let mut reader = Reader::new(file, schema, config).unwrap();
    let mut record = Message::default();
    let mut i = 0;
    while reader.read_record(&binding, &mut record).unwrap() {
        let mut expected = sample(i);
        if expected.lang.is_none() {
            // No default on Lang: the previous record's value is left alone.
            expected.lang = record.lang.clone();
        }
        assert_eq!(record, expected);
        i += 1;
    }
    assert_eq!(i, 100);
    assert_eq!(reader.stats(), written);
}

#[test]
fn test_rows_iterator() {
    let schema = message();
    let rows: Vec<Row> = (0..5)
        .map(|i| {
            row_of(
                &schema,
                vec![Some(Value::Uint(i)), Some(Value::Uint(7)), None, None],
            )
        })
        .collect();
    let bytes = encode(&schema, CodecConfig::for_testing(), &rows);
    let mut reader = Reader::new(bytes.as_slice(), schema, CodecConfig::for_testing()).unwrap();
    let ids: Vec<u64> = reader
        .rows()
        .map(|r| r.unwrap().get(0).and_then(Value::as_uint).unwrap())
        .collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_writers_share_the_pool_across_threads() {
    let schema = message();
    let pool = Arc::new(BuilderPool::new(4));
    let config = CodecConfig::new().with_page_rows(8);

    let handles: Vec<_> = (0..6u64)
        .map(|t| {
            let schema = Arc::clone(&schema);
            let pool = Arc::clone(&pool);
            let config = config.clone();
            thread::spawn(move || {
                let mut writer =
                    Writer::with_pool(Vec::new(), Arc::clone(&schema), config.clone(), pool)
                        .unwrap();
                for i in 0..20 {
                    let row = row_of(
                        &schema,
                        vec![
                            Some(Value::Uint(i)),
                            Some(Value::Uint(t)),
                            Some(Value::Str(format!("t{} r{}", t, i))),
                            None,
                        ],
                    );
                    writer.write_row(&row).unwrap();
                }
                let bytes = writer.into_inner().unwrap();
                let decoded = decode(&schema, config, &bytes);
                assert_eq!(decoded.len(), 20);
                assert!(decoded.iter().all(|r| r[1] == Some(Value::Uint(t))));
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    let idle = pool.idle_count(&schema, 8);
    assert!(idle >= 1 && idle <= 4);
}

#[test]
fn test_writer_rejects_use_after_close() {
    let schema = message();
    let mut writer = Writer::new(Vec::new(), Arc::clone(&schema), CodecConfig::default()).unwrap();
    writer.close().unwrap();
    writer.close().unwrap();
    let row = row_of(&schema, vec![None, None, None, None]);
    assert!(matches!(
        writer.write_row(&row),
        Err(ScrtError::InvalidOperation(_))
    ));
}

#[test]
fn test_unfinalized_schema_is_rejected() {
    let raw = Arc::new(message_schema());
    assert!(matches!(
        Writer::new(Vec::new(), Arc::clone(&raw), CodecConfig::default()),
        Err(ScrtError::UnresolvedSchema(_))
    ));

    let schema = message();
    let bytes = encode(&schema, CodecConfig::default(), &[]);
    assert!(matches!(
        Reader::new(bytes.as_slice(), raw, CodecConfig::default()).err(),
        Some(ScrtError::UnresolvedSchema(_))
    ));
}

#[test]
fn test_unterminated_stream_ends_at_page_boundary() {
    init_tracing();
    let schema = message();
    let rows: Vec<Row> = (0..3)
        .map(|i| row_of(&schema, vec![Some(Value::Uint(i)), None, None, None]))
        .collect();
    let mut bytes = encode(&schema, CodecConfig::default(), &rows);
    assert_eq!(bytes.pop(), Some(0));
    assert_eq!(decode(&schema, CodecConfig::default(), &bytes).len(), 3);
}

#[test]
fn test_schema_without_fields_round_trips() {
    let empty = Schema::new("Empty", vec![]);
    empty.finalize().unwrap();
    let empty = Arc::new(empty);
    let rows: Vec<Row> = (0..2500).map(|_| Row::new(Arc::clone(&empty))).collect();
    let config = CodecConfig::default().with_pooling(false);
    let bytes = encode(&empty, config.clone(), &rows);
    assert_eq!(count_pages(&bytes), 3);

    let decoded = decode(&empty, config, &bytes);
    assert_eq!(decoded.len(), 2500);
    assert!(decoded.iter().all(Vec::is_empty));
}

//! Bytes column: count, then length-prefixed values.
//!
//! Values are appended to one arena per page; the decoder keeps only spans
//! into the page buffer.

use super::{ColumnEncoder, MAX_ARENA_BYTES};
use crate::varint::{put_uvarint, ByteCursor, Span};
use scrt_core::{Result, ScrtError};

/// Encoder for raw byte columns.
#[derive(Debug, Clone, Default)]
pub struct BytesEncoder {
    arena: Vec<u8>,
    spans: Vec<Span>,
}

impl BytesEncoder {
    /// Empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer one value.
    pub fn append(&mut self, value: &[u8]) -> Result<()> {
        if self.arena.len() + value.len() > MAX_ARENA_BYTES {
            return Err(ScrtError::ValueOverflow(format!(
                "bytes arena would exceed {} bytes",
                MAX_ARENA_BYTES
            )));
        }
        self.spans.push(Span {
            offset: self.arena.len(),
            len: value.len(),
        });
        self.arena.extend_from_slice(value);
        Ok(())
    }
}

impl ColumnEncoder for BytesEncoder {
    fn len(&self) -> usize {
        self.spans.len()
    }

    fn encode(&self, dst: &mut Vec<u8>) {
        put_uvarint(dst, self.spans.len() as u64);
        for span in &self.spans {
            put_uvarint(dst, span.len as u64);
            dst.extend_from_slice(span.slice(&self.arena));
        }
    }

    fn truncate(&mut self, len: usize) {
        if let Some(span) = self.spans.get(len) {
            self.arena.truncate(span.offset);
        }
        self.spans.truncate(len);
    }

    fn reset(&mut self) {
        self.arena.clear();
        self.spans.clear();
    }
}

pub(super) fn decode(cur: &mut ByteCursor<'_>, out: &mut Vec<Span>) -> Result<()> {
    out.clear();
    let count = cur.read_uvarint()?;
    let count = cur.check_count(count, 1)?;
    out.reserve(count);
    for _ in 0..count {
        let len = cur.read_len()?;
        out.push(cur.read_span(len)?);
    }
    Ok(())
}

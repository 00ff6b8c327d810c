//! String column: page-local dictionary.
//!
//! Each distinct string is stored once, in first-seen order, followed by one
//! dictionary index per row. Low-cardinality fields (languages, statuses,
//! tags) shrink to a byte or two per row.
//!
//! Lookup hashes the string and keeps candidate entry indices per hash, so
//! no per-entry `String` is allocated; entries live in one arena.

use super::{ColumnEncoder, MAX_ARENA_BYTES};
use crate::varint::{put_uvarint, ByteCursor, Span};
use rustc_hash::{FxHashMap, FxHasher};
use scrt_core::{Result, ScrtError};
use smallvec::SmallVec;
use std::hash::Hasher;

/// Encoder for dictionary-compressed string columns.
#[derive(Debug, Clone, Default)]
pub struct StringEncoder {
    arena: Vec<u8>,
    entries: Vec<Span>,
    lookup: FxHashMap<u64, SmallVec<[u32; 1]>>,
    indices: Vec<u32>,
}

fn hash_str(s: &str) -> u64 {
    let mut h = FxHasher::default();
    h.write(s.as_bytes());
    h.finish()
}

impl StringEncoder {
    /// Empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer one value, adding it to the dictionary if unseen.
    pub fn append(&mut self, value: &str) -> Result<()> {
        let hash = hash_str(value);
        if let Some(candidates) = self.lookup.get(&hash) {
            for &idx in candidates {
                if self.entries[idx as usize].slice(&self.arena) == value.as_bytes() {
                    self.indices.push(idx);
                    return Ok(());
                }
            }
        }
        if self.arena.len() + value.len() > MAX_ARENA_BYTES {
            return Err(ScrtError::ValueOverflow(format!(
                "string dictionary would exceed {} bytes",
                MAX_ARENA_BYTES
            )));
        }
        let idx = u32::try_from(self.entries.len())
            .map_err(|_| ScrtError::ValueOverflow("too many dictionary entries".into()))?;
        self.entries.push(Span {
            offset: self.arena.len(),
            len: value.len(),
        });
        self.arena.extend_from_slice(value.as_bytes());
        self.lookup.entry(hash).or_default().push(idx);
        self.indices.push(idx);
        Ok(())
    }

    /// Number of distinct strings buffered.
    pub fn dictionary_len(&self) -> usize {
        self.entries.len()
    }

    fn drop_entries_from(&mut self, first: u32) {
        if let Some(span) = self.entries.get(first as usize) {
            self.arena.truncate(span.offset);
        }
        self.entries.truncate(first as usize);
        self.lookup.retain(|_, candidates| {
            candidates.retain(|idx| *idx < first);
            !candidates.is_empty()
        });
    }
}

impl ColumnEncoder for StringEncoder {
    fn len(&self) -> usize {
        self.indices.len()
    }

    fn encode(&self, dst: &mut Vec<u8>) {
        put_uvarint(dst, self.entries.len() as u64);
        for span in &self.entries {
            put_uvarint(dst, span.len as u64);
            dst.extend_from_slice(span.slice(&self.arena));
        }
        put_uvarint(dst, self.indices.len() as u64);
        for &idx in &self.indices {
            put_uvarint(dst, idx as u64);
        }
    }

    fn truncate(&mut self, len: usize) {
        if len >= self.indices.len() {
            return;
        }
        self.indices.truncate(len);
        // Entries are first-seen, so anything introduced by the dropped rows
        // has an index above every surviving one.
        let keep = self.indices.iter().max().map_or(0, |m| m + 1);
        if (keep as usize) < self.entries.len() {
            self.drop_entries_from(keep);
        }
    }

    fn reset(&mut self) {
        self.arena.clear();
        self.entries.clear();
        self.lookup.clear();
        self.indices.clear();
    }
}

pub(super) fn decode(
    cur: &mut ByteCursor<'_>,
    dictionary: &mut Vec<Span>,
    indices: &mut Vec<u32>,
) -> Result<()> {
    dictionary.clear();
    indices.clear();

    let entries = cur.read_uvarint()?;
    let entries = cur.check_count(entries, 1)?;
    dictionary.reserve(entries);
    for _ in 0..entries {
        let len = cur.read_len()?;
        let offset = cur.position();
        std::str::from_utf8(cur.read_bytes(len)?)
            .map_err(|_| ScrtError::malformed("dictionary entry is not valid UTF-8"))?;
        dictionary.push(Span { offset, len });
    }

    let count = cur.read_uvarint()?;
    let count = cur.check_count(count, 1)?;
    indices.reserve(count);
    for _ in 0..count {
        let idx = cur.read_uvarint()?;
        if idx >= dictionary.len() as u64 {
            return Err(ScrtError::IndexOutOfRange {
                what: "dictionary",
                index: idx,
                len: dictionary.len(),
            });
        }
        indices.push(idx as u32);
    }
    Ok(())
}

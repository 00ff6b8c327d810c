//! Uint64 column: delta-varint when the run is non-decreasing.
//!
//! Header is `(count << 1) | monotonic`. With the flag set the first value is
//! written as-is and every later value as its (non-negative) difference from
//! its predecessor, which turns auto-increment IDs into one byte each.
//! Without it, each value is written directly.

use super::ColumnEncoder;
use crate::varint::{put_uvarint, ByteCursor};
use scrt_core::{Result, ScrtError};

/// Encoder for unsigned 64-bit columns.
#[derive(Debug, Clone, Default)]
pub struct UintEncoder {
    values: Vec<u64>,
}

impl UintEncoder {
    /// Empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer one value.
    pub fn append(&mut self, value: u64) {
        self.values.push(value);
    }

    /// Whether the buffered values are non-decreasing.
    pub fn is_monotonic(&self) -> bool {
        self.values.windows(2).all(|w| w[0] <= w[1])
    }
}

impl ColumnEncoder for UintEncoder {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn encode(&self, dst: &mut Vec<u8>) {
        let monotonic = !self.values.is_empty() && self.is_monotonic();
        put_uvarint(dst, ((self.values.len() as u64) << 1) | monotonic as u64);
        if monotonic {
            let mut prev = self.values[0];
            put_uvarint(dst, prev);
            for &v in &self.values[1..] {
                put_uvarint(dst, v - prev);
                prev = v;
            }
        } else {
            for &v in &self.values {
                put_uvarint(dst, v);
            }
        }
    }

    fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }

    fn reset(&mut self) {
        self.values.clear();
    }
}

pub(super) fn decode(cur: &mut ByteCursor<'_>, out: &mut Vec<u64>) -> Result<()> {
    out.clear();
    let header = cur.read_uvarint()?;
    let count = cur.check_count(header >> 1, 1)?;
    let monotonic = header & 1 == 1;
    out.reserve(count);
    if monotonic && count > 0 {
        let mut prev = cur.read_uvarint()?;
        out.push(prev);
        for _ in 1..count {
            let delta = cur.read_uvarint()?;
            prev = prev
                .checked_add(delta)
                .ok_or_else(|| ScrtError::malformed("uint delta overflows u64"))?;
            out.push(prev);
        }
    } else {
        for _ in 0..count {
            out.push(cur.read_uvarint()?);
        }
    }
    Ok(())
}

//! Int64 column: zig-zag delta-varint.
//!
//! Header is `(count << 1) | delta`. Unlike the unsigned column, delta mode
//! is used for every run longer than one value, monotonic or not; zig-zag
//! keeps negative differences short. Differences wrap, so any pair of `i64`
//! values round-trips.

use super::ColumnEncoder;
use crate::varint::{put_varint, put_uvarint, ByteCursor};
use scrt_core::Result;

/// Encoder for signed 64-bit columns (and nanosecond-tick temporal kinds).
#[derive(Debug, Clone, Default)]
pub struct IntEncoder {
    values: Vec<i64>,
}

impl IntEncoder {
    /// Empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer one value.
    pub fn append(&mut self, value: i64) {
        self.values.push(value);
    }
}

impl ColumnEncoder for IntEncoder {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn encode(&self, dst: &mut Vec<u8>) {
        let delta = self.values.len() > 1;
        put_uvarint(dst, ((self.values.len() as u64) << 1) | delta as u64);
        if delta {
            let mut prev = self.values[0];
            put_varint(dst, prev);
            for &v in &self.values[1..] {
                put_varint(dst, v.wrapping_sub(prev));
                prev = v;
            }
        } else {
            for &v in &self.values {
                put_varint(dst, v);
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

pub(super) fn decode(cur: &mut ByteCursor<'_>, out: &mut Vec<i64>) -> Result<()> {
    out.clear();
    let header = cur.read_uvarint()?;
    let count = cur.check_count(header >> 1, 1)?;
    let delta = header & 1 == 1;
    out.reserve(count);
    if delta && count > 0 {
        let mut prev = cur.read_varint()?;
        out.push(prev);
        for _ in 1..count {
            prev = prev.wrapping_add(cur.read_varint()?);
            out.push(prev);
        }
    } else {
        for _ in 0..count {
            out.push(cur.read_varint()?);
        }
    }
    Ok(())
}

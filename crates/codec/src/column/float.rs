//! Float64 column: count, then raw little-endian doubles.

use super::ColumnEncoder;
use crate::varint::{put_uvarint, ByteCursor};
use byteorder::{ByteOrder, LittleEndian};
use scrt_core::Result;

/// Encoder for 64-bit float columns.
#[derive(Debug, Clone, Default)]
pub struct FloatEncoder {
    values: Vec<f64>,
}

impl FloatEncoder {
    /// Empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer one value.
    pub fn append(&mut self, value: f64) {
        self.values.push(value);
    }
}

impl ColumnEncoder for FloatEncoder {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn encode(&self, dst: &mut Vec<u8>) {
        put_uvarint(dst, self.values.len() as u64);
        let start = dst.len();
        dst.resize(start + self.values.len() * 8, 0);
        LittleEndian::write_f64_into(&self.values, &mut dst[start..]);
    }

    fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }

    fn reset(&mut self) {
        self.values.clear();
    }
}

pub(super) fn decode(cur: &mut ByteCursor<'_>, out: &mut Vec<f64>) -> Result<()> {
    out.clear();
    let count = cur.read_uvarint()?;
    let count = cur.check_count(count, 8)?;
    out.reserve(count);
    for _ in 0..count {
        out.push(cur.read_f64_le()?);
    }
    Ok(())
}

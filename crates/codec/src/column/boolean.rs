//! Bool column: count, then one byte (0 or 1) per value.

use super::ColumnEncoder;
use crate::varint::{put_uvarint, ByteCursor};
use scrt_core::{Result, ScrtError};

/// Encoder for boolean columns.
#[derive(Debug, Clone, Default)]
pub struct BoolEncoder {
    values: Vec<bool>,
}

impl BoolEncoder {
    /// Empty encoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer one value.
    pub fn append(&mut self, value: bool) {
        self.values.push(value);
    }
}

impl ColumnEncoder for BoolEncoder {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn encode(&self, dst: &mut Vec<u8>) {
        put_uvarint(dst, self.values.len() as u64);
        dst.extend(self.values.iter().map(|&v| v as u8));
    }

    fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }

    fn reset(&mut self) {
        self.values.clear();
    }
}

pub(super) fn decode(cur: &mut ByteCursor<'_>, out: &mut Vec<bool>) -> Result<()> {
    out.clear();
    let count = cur.read_uvarint()?;
    let count = cur.check_count(count, 1)?;
    out.reserve(count);
    for _ in 0..count {
        out.push(match cur.read_u8()? {
            0 => false,
            1 => true,
            other => {
                return Err(ScrtError::malformed(format!(
                    "invalid bool byte {:#04x}",
                    other
                )))
            }
        });
    }
    Ok(())
}

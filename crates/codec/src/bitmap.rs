//! Presence bitmaps
//!
//! One bit per row, least-significant bit first within each byte: row `r`
//! lives at bit `r % 8` of byte `r / 8`. A set bit means the field was
//! explicitly set on that row.

/// Number of bytes needed for `rows` bits.
pub fn byte_len(rows: usize) -> usize {
    (rows + 7) / 8
}

/// Test bit `index` in a raw bitmap.
pub fn is_set(bits: &[u8], index: usize) -> bool {
    bits.get(index / 8)
        .map_or(false, |byte| byte & (1 << (index % 8)) != 0)
}

/// Growable presence bitmap.
#[derive(Debug, Clone, Default)]
pub struct PresenceBitmap {
    bits: Vec<u8>,
    len: usize,
}

impl PresenceBitmap {
    /// Empty bitmap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty bitmap with room for `rows` bits.
    pub fn with_capacity(rows: usize) -> Self {
        PresenceBitmap {
            bits: Vec::with_capacity(byte_len(rows)),
            len: 0,
        }
    }

    /// Append one bit.
    pub fn push(&mut self, present: bool) {
        if self.len % 8 == 0 {
            self.bits.push(0);
        }
        if present {
            let last = self.bits.len() - 1;
            self.bits[last] |= 1 << (self.len % 8);
        }
        self.len += 1;
    }

    /// Bit at `index`.
    pub fn get(&self, index: usize) -> bool {
        index < self.len && is_set(&self.bits, index)
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the bitmap has no bits.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop bits beyond `len`.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.bits.truncate(byte_len(len));
        if len % 8 != 0 {
            if let Some(last) = self.bits.last_mut() {
                *last &= (1u8 << (len % 8)) - 1;
            }
        }
        self.len = len;
    }

    /// Remove all bits, keeping the allocation.
    pub fn clear(&mut self) {
        self.bits.clear();
        self.len = 0;
    }

    /// Packed bytes, `byte_len(len())` long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }
}

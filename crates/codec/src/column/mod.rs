//! Column encoders and decoders
//!
//! Each encoder batches one field's values for the rows of one page and
//! writes a self-delimiting payload:
//!
//! ```text
//! Uint64  : uvarint((count << 1) | monotonic) then first, deltas... (or values...)
//! Int64   : uvarint((count << 1) | delta) then zig-zag first, deltas... (or values...)
//! String  : uvarint(entries) (uvarint(len) bytes)*  uvarint(count) uvarint(index)*
//! Bool    : uvarint(count) byte*
//! Float64 : uvarint(count) f64-le*
//! Bytes   : uvarint(count) (uvarint(len) bytes)*
//! ```
//!
//! Encoders keep their allocations across `reset`, so one builder encodes
//! page after page without growing.

mod boolean;
mod bytes;
mod float;
mod int;
mod string;
mod uint;

pub use self::boolean::BoolEncoder;
pub use self::bytes::BytesEncoder;
pub use self::float::FloatEncoder;
pub use self::int::IntEncoder;
pub use self::string::StringEncoder;
pub use self::uint::UintEncoder;

use crate::value::ValueRef;
use crate::varint::{ByteCursor, Span};
use scrt_core::{ColumnType, Result, ScrtError};

/// Largest string or byte value, and largest per-page arena (4 GiB - 1).
pub const MAX_ARENA_BYTES: usize = u32::MAX as usize;

/// Common behaviour of per-kind column encoders.
pub trait ColumnEncoder {
    /// Number of buffered values.
    fn len(&self) -> usize;

    /// Whether no values are buffered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append the self-delimiting payload to `dst`.
    fn encode(&self, dst: &mut Vec<u8>);

    /// Drop buffered values beyond `len` (used to abandon a partial row).
    fn truncate(&mut self, len: usize);

    /// Clear buffered values, keeping capacity.
    fn reset(&mut self);
}

/// One column's encoder, selected by storage class.
#[derive(Debug, Clone)]
pub enum ColumnBuffer {
    /// Delta-varint unsigned integers
    Uint(UintEncoder),
    /// Zig-zag delta signed integers
    Int(IntEncoder),
    /// Little-endian doubles
    Float(FloatEncoder),
    /// Byte-per-value booleans
    Bool(BoolEncoder),
    /// Dictionary strings
    Str(StringEncoder),
    /// Arena-backed byte strings
    Bytes(BytesEncoder),
}

impl ColumnBuffer {
    /// Empty encoder for `column_type`.
    pub fn for_type(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Uint => ColumnBuffer::Uint(UintEncoder::new()),
            ColumnType::Int => ColumnBuffer::Int(IntEncoder::new()),
            ColumnType::Float => ColumnBuffer::Float(FloatEncoder::new()),
            ColumnType::Bool => ColumnBuffer::Bool(BoolEncoder::new()),
            ColumnType::Str => ColumnBuffer::Str(StringEncoder::new()),
            ColumnType::Bytes => ColumnBuffer::Bytes(BytesEncoder::new()),
        }
    }

    /// Storage class of this encoder.
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnBuffer::Uint(_) => ColumnType::Uint,
            ColumnBuffer::Int(_) => ColumnType::Int,
            ColumnBuffer::Float(_) => ColumnType::Float,
            ColumnBuffer::Bool(_) => ColumnType::Bool,
            ColumnBuffer::Str(_) => ColumnType::Str,
            ColumnBuffer::Bytes(_) => ColumnType::Bytes,
        }
    }

    /// Append a value of the matching storage class.
    ///
    /// Returns `None` when the value's class differs from the encoder's.
    pub fn append(&mut self, value: ValueRef<'_>) -> Option<Result<()>> {
        match (self, value) {
            (ColumnBuffer::Uint(e), ValueRef::Uint(v)) => e.append(v),
            (ColumnBuffer::Int(e), ValueRef::Int(v)) => e.append(v),
            (ColumnBuffer::Float(e), ValueRef::Float(v)) => e.append(v),
            (ColumnBuffer::Bool(e), ValueRef::Bool(v)) => e.append(v),
            (ColumnBuffer::Str(e), ValueRef::Str(s)) => return Some(e.append(s)),
            (ColumnBuffer::Bytes(e), ValueRef::Bytes(b)) => return Some(e.append(b)),
            _ => return None,
        }
        Some(Ok(()))
    }

    /// The encoder behind the dispatch.
    pub fn encoder(&self) -> &dyn ColumnEncoder {
        match self {
            ColumnBuffer::Uint(e) => e,
            ColumnBuffer::Int(e) => e,
            ColumnBuffer::Float(e) => e,
            ColumnBuffer::Bool(e) => e,
            ColumnBuffer::Str(e) => e,
            ColumnBuffer::Bytes(e) => e,
        }
    }

    /// Mutable encoder behind the dispatch.
    pub fn encoder_mut(&mut self) -> &mut dyn ColumnEncoder {
        match self {
            ColumnBuffer::Uint(e) => e,
            ColumnBuffer::Int(e) => e,
            ColumnBuffer::Float(e) => e,
            ColumnBuffer::Bool(e) => e,
            ColumnBuffer::Str(e) => e,
            ColumnBuffer::Bytes(e) => e,
        }
    }
}

/// Decoded values of one column of the current page.
///
/// String and byte data stay in the page buffer; only spans are kept.
#[derive(Debug, Clone)]
pub enum DecodedValues {
    /// Unsigned integers
    Uint(Vec<u64>),
    /// Signed integers
    Int(Vec<i64>),
    /// Doubles
    Float(Vec<f64>),
    /// Booleans
    Bool(Vec<bool>),
    /// Dictionary entries plus one dictionary index per row
    Str {
        /// Unique values in first-seen order
        dictionary: Vec<Span>,
        /// Per-row index into `dictionary`
        indices: Vec<u32>,
    },
    /// One span per row
    Bytes(Vec<Span>),
}

impl DecodedValues {
    /// Empty decoder for `column_type`.
    pub fn for_type(column_type: ColumnType) -> Self {
        match column_type {
            ColumnType::Uint => DecodedValues::Uint(Vec::new()),
            ColumnType::Int => DecodedValues::Int(Vec::new()),
            ColumnType::Float => DecodedValues::Float(Vec::new()),
            ColumnType::Bool => DecodedValues::Bool(Vec::new()),
            ColumnType::Str => DecodedValues::Str {
                dictionary: Vec::new(),
                indices: Vec::new(),
            },
            ColumnType::Bytes => DecodedValues::Bytes(Vec::new()),
        }
    }

    /// Decode one payload, replacing the previous page's values.
    pub fn decode(&mut self, cur: &mut ByteCursor<'_>) -> Result<()> {
        match self {
            DecodedValues::Uint(out) => uint::decode(cur, out),
            DecodedValues::Int(out) => int::decode(cur, out),
            DecodedValues::Float(out) => float::decode(cur, out),
            DecodedValues::Bool(out) => boolean::decode(cur, out),
            DecodedValues::Str {
                dictionary,
                indices,
            } => string::decode(cur, dictionary, indices),
            DecodedValues::Bytes(out) => bytes::decode(cur, out),
        }
    }

    /// Number of decoded rows.
    pub fn len(&self) -> usize {
        match self {
            DecodedValues::Uint(v) => v.len(),
            DecodedValues::Int(v) => v.len(),
            DecodedValues::Float(v) => v.len(),
            DecodedValues::Bool(v) => v.len(),
            DecodedValues::Str { indices, .. } => indices.len(),
            DecodedValues::Bytes(v) => v.len(),
        }
    }

    /// Whether no rows were decoded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `row`, borrowing string and byte data from `page`.
    pub fn get<'a>(&self, page: &'a [u8], row: usize) -> Result<ValueRef<'a>> {
        let out_of_range = |len: usize| ScrtError::IndexOutOfRange {
            what: "row",
            index: row as u64,
            len,
        };
        Ok(match self {
            DecodedValues::Uint(v) => ValueRef::Uint(*v.get(row).ok_or_else(|| out_of_range(v.len()))?),
            DecodedValues::Int(v) => ValueRef::Int(*v.get(row).ok_or_else(|| out_of_range(v.len()))?),
            DecodedValues::Float(v) => {
                ValueRef::Float(*v.get(row).ok_or_else(|| out_of_range(v.len()))?)
            }
            DecodedValues::Bool(v) => ValueRef::Bool(*v.get(row).ok_or_else(|| out_of_range(v.len()))?),
            DecodedValues::Str {
                dictionary,
                indices,
            } => {
                let index = *indices.get(row).ok_or_else(|| out_of_range(indices.len()))?;
                let span = dictionary
                    .get(index as usize)
                    .ok_or(ScrtError::IndexOutOfRange {
                        what: "dictionary",
                        index: index as u64,
                        len: dictionary.len(),
                    })?;
                let s = std::str::from_utf8(span.slice(page))
                    .map_err(|_| ScrtError::malformed("string value is not valid UTF-8"))?;
                ValueRef::Str(s)
            }
            DecodedValues::Bytes(v) => {
                let span = v.get(row).ok_or_else(|| out_of_range(v.len()))?;
                ValueRef::Bytes(span.slice(page))
            }
        })
    }
}

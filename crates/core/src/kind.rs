//! Field kinds and their storage classes
//!
//! A [`FieldKind`] is what a schema declares. A [`ColumnType`] is how the
//! codec stores it: temporal kinds collapse onto `Int` (nanosecond ticks) or
//! `Str` (offset-preserving timestamps), and `Ref` has no storage class of its
//! own until it is resolved against its target.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared kind of a schema field.
///
/// The discriminant is the byte written in each page column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FieldKind {
    /// Unsigned 64-bit integer
    Uint64 = 0,
    /// UTF-8 string
    String = 1,
    /// Reference to another schema's field; storage follows the target
    Ref = 2,
    /// Boolean
    Bool = 3,
    /// Signed 64-bit integer
    Int64 = 4,
    /// IEEE 754 double
    Float64 = 5,
    /// Opaque byte string
    Bytes = 6,
    /// Calendar date, stored as nanosecond ticks at midnight UTC
    Date = 7,
    /// Naive date-time, stored as nanosecond ticks
    DateTime = 8,
    /// Instant, stored as UTC nanosecond ticks
    Timestamp = 9,
    /// Instant with offset, stored as a canonical RFC 3339 string
    TimestampTZ = 10,
    /// Signed span, stored as nanoseconds
    Duration = 11,
}

/// Physical storage class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Delta-varint unsigned integers
    Uint,
    /// Zig-zag delta-varint signed integers
    Int,
    /// Fixed-width little-endian doubles
    Float,
    /// One byte per value
    Bool,
    /// Page-local dictionary strings
    Str,
    /// Length-prefixed byte strings
    Bytes,
}

impl FieldKind {
    /// All kinds in wire order.
    pub const ALL: [FieldKind; 12] = [
        FieldKind::Uint64,
        FieldKind::String,
        FieldKind::Ref,
        FieldKind::Bool,
        FieldKind::Int64,
        FieldKind::Float64,
        FieldKind::Bytes,
        FieldKind::Date,
        FieldKind::DateTime,
        FieldKind::Timestamp,
        FieldKind::TimestampTZ,
        FieldKind::Duration,
    ];

    /// Wire byte for this kind.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a wire byte.
    pub fn from_u8(byte: u8) -> Option<FieldKind> {
        FieldKind::ALL.get(byte as usize).copied()
    }

    /// Lowercase type name, as written in schema source.
    pub fn name(self) -> &'static str {
        match self {
            FieldKind::Uint64 => "uint64",
            FieldKind::String => "string",
            FieldKind::Ref => "ref",
            FieldKind::Bool => "bool",
            FieldKind::Int64 => "int64",
            FieldKind::Float64 => "float64",
            FieldKind::Bytes => "bytes",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Timestamp => "timestamp",
            FieldKind::TimestampTZ => "timestamptz",
            FieldKind::Duration => "duration",
        }
    }

    /// Look up a kind by its type name (case-insensitive).
    pub fn from_name(name: &str) -> Option<FieldKind> {
        let lower = name.to_ascii_lowercase();
        FieldKind::ALL.iter().copied().find(|k| k.name() == lower)
    }

    /// Storage class, or `None` for an unresolved `Ref`.
    pub fn column_type(self) -> Option<ColumnType> {
        match self {
            FieldKind::Uint64 => Some(ColumnType::Uint),
            FieldKind::String | FieldKind::TimestampTZ => Some(ColumnType::Str),
            FieldKind::Ref => None,
            FieldKind::Bool => Some(ColumnType::Bool),
            FieldKind::Int64
            | FieldKind::Date
            | FieldKind::DateTime
            | FieldKind::Timestamp
            | FieldKind::Duration => Some(ColumnType::Int),
            FieldKind::Float64 => Some(ColumnType::Float),
            FieldKind::Bytes => Some(ColumnType::Bytes),
        }
    }

    /// Whether values of this kind are temporal ticks or timestamps.
    pub fn is_temporal(self) -> bool {
        matches!(
            self,
            FieldKind::Date
                | FieldKind::DateTime
                | FieldKind::Timestamp
                | FieldKind::TimestampTZ
                | FieldKind::Duration
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ColumnType {
    /// Short name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Uint => "uint",
            ColumnType::Int => "int",
            ColumnType::Float => "float",
            ColumnType::Bool => "bool",
            ColumnType::Str => "str",
            ColumnType::Bytes => "bytes",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

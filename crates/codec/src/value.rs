//! Row values
//!
//! [`Value`] owns its data and outlives any page. [`ValueRef`] borrows
//! string and byte data straight out of a reader's page buffer; the borrow
//! ends before the reader can load the next page.

use scrt_core::{ColumnType, DefaultValue};

/// An owned field value, tagged by storage class.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Uint64
    Uint(u64),
    /// Int64, Date, DateTime, Timestamp, Duration
    Int(i64),
    /// Float64
    Float(f64),
    /// Bool
    Bool(bool),
    /// String, TimestampTZ
    Str(String),
    /// Bytes
    Bytes(Vec<u8>),
}

/// A borrowed field value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'a> {
    /// Uint64
    Uint(u64),
    /// Int64 and tick kinds
    Int(i64),
    /// Float64
    Float(f64),
    /// Bool
    Bool(bool),
    /// String, TimestampTZ
    Str(&'a str),
    /// Bytes
    Bytes(&'a [u8]),
}

impl Value {
    /// Storage class of this value.
    pub fn column_type(&self) -> ColumnType {
        self.as_ref().column_type()
    }

    /// Borrow as a [`ValueRef`].
    pub fn as_ref(&self) -> ValueRef<'_> {
        match self {
            Value::Uint(v) => ValueRef::Uint(*v),
            Value::Int(v) => ValueRef::Int(*v),
            Value::Float(v) => ValueRef::Float(*v),
            Value::Bool(v) => ValueRef::Bool(*v),
            Value::Str(s) => ValueRef::Str(s),
            Value::Bytes(b) => ValueRef::Bytes(b),
        }
    }

    /// The unsigned payload, if this is `Uint`.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// The signed payload, if this is `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The float payload, if this is `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The bool payload, if this is `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The string payload, if this is `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The byte payload, if this is `Bytes`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Overwrite `self` with `src`, reusing the string or byte allocation
    /// when both sides are the same variant.
    pub(crate) fn assign(&mut self, src: ValueRef<'_>) {
        match (self, src) {
            (Value::Str(dst), ValueRef::Str(s)) => {
                dst.clear();
                dst.push_str(s);
            }
            (Value::Bytes(dst), ValueRef::Bytes(b)) => {
                dst.clear();
                dst.extend_from_slice(b);
            }
            (slot, src) => *slot = src.to_value(),
        }
    }
}

impl<'a> ValueRef<'a> {
    /// Storage class of this value.
    pub fn column_type(&self) -> ColumnType {
        match self {
            ValueRef::Uint(_) => ColumnType::Uint,
            ValueRef::Int(_) => ColumnType::Int,
            ValueRef::Float(_) => ColumnType::Float,
            ValueRef::Bool(_) => ColumnType::Bool,
            ValueRef::Str(_) => ColumnType::Str,
            ValueRef::Bytes(_) => ColumnType::Bytes,
        }
    }

    /// Zero value of a storage class.
    pub fn zero(column_type: ColumnType) -> ValueRef<'static> {
        match column_type {
            ColumnType::Uint => ValueRef::Uint(0),
            ColumnType::Int => ValueRef::Int(0),
            ColumnType::Float => ValueRef::Float(0.0),
            ColumnType::Bool => ValueRef::Bool(false),
            ColumnType::Str => ValueRef::Str(""),
            ColumnType::Bytes => ValueRef::Bytes(&[]),
        }
    }

    /// Copy into an owned [`Value`].
    pub fn to_value(&self) -> Value {
        match *self {
            ValueRef::Uint(v) => Value::Uint(v),
            ValueRef::Int(v) => Value::Int(v),
            ValueRef::Float(v) => Value::Float(v),
            ValueRef::Bool(v) => Value::Bool(v),
            ValueRef::Str(s) => Value::Str(s.to_string()),
            ValueRef::Bytes(b) => Value::Bytes(b.to_vec()),
        }
    }

    /// The string payload, if this is `Str`.
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            ValueRef::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The byte payload, if this is `Bytes`.
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match *self {
            ValueRef::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl<'a> From<&'a DefaultValue> for ValueRef<'a> {
    fn from(d: &'a DefaultValue) -> Self {
        match d {
            DefaultValue::Uint(v) => ValueRef::Uint(*v),
            DefaultValue::Int(v) => ValueRef::Int(*v),
            DefaultValue::Float(v) => ValueRef::Float(*v),
            DefaultValue::Bool(v) => ValueRef::Bool(*v),
            DefaultValue::Str(s) => ValueRef::Str(s),
            DefaultValue::Bytes(b) => ValueRef::Bytes(b),
        }
    }
}

impl From<&DefaultValue> for Value {
    fn from(d: &DefaultValue) -> Self {
        ValueRef::from(d).to_value()
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

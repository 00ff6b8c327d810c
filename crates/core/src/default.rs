//! Field default values
//!
//! A default is declared either as an already-typed [`DefaultValue`] or as a
//! textual literal whose meaning depends on the field's resolved kind (a Ref
//! field only learns its kind at finalize time). Defaults are substituted on
//! every write and read of an unset field; they never become authoritative
//! stored bytes.

use crate::fnv::Fnv1a64;
use crate::kind::{ColumnType, FieldKind};
use crate::temporal;
use serde::{Deserialize, Serialize};
use std::hash::Hasher;

/// A typed default, tagged by storage class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultValue {
    /// Uint64
    Uint(u64),
    /// Int64 and nanosecond-tick temporal kinds
    Int(i64),
    /// Float64
    Float(f64),
    /// Bool
    Bool(bool),
    /// String and TimestampTZ
    Str(String),
    /// Bytes
    Bytes(Vec<u8>),
}

/// How a default was declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefaultDecl {
    /// Already typed
    Value(DefaultValue),
    /// Textual literal, parsed once the field kind is resolved
    Literal(String),
}

impl DefaultValue {
    /// Storage class this default belongs to.
    pub fn column_type(&self) -> ColumnType {
        match self {
            DefaultValue::Uint(_) => ColumnType::Uint,
            DefaultValue::Int(_) => ColumnType::Int,
            DefaultValue::Float(_) => ColumnType::Float,
            DefaultValue::Bool(_) => ColumnType::Bool,
            DefaultValue::Str(_) => ColumnType::Str,
            DefaultValue::Bytes(_) => ColumnType::Bytes,
        }
    }

    /// Parse a literal under a resolved kind.
    ///
    /// Returns `None` when the literal is not representable, or when `kind`
    /// is an unresolved `Ref`.
    pub fn parse_literal(kind: FieldKind, literal: &str) -> Option<DefaultValue> {
        let text = literal.trim();
        match kind {
            FieldKind::Uint64 => text.parse().ok().map(DefaultValue::Uint),
            FieldKind::Int64 => text.parse().ok().map(DefaultValue::Int),
            FieldKind::Float64 => text.parse().ok().map(DefaultValue::Float),
            FieldKind::Bool => match text {
                "true" => Some(DefaultValue::Bool(true)),
                "false" => Some(DefaultValue::Bool(false)),
                _ => None,
            },
            FieldKind::String => Some(DefaultValue::Str(unquote(text).to_string())),
            FieldKind::Bytes => parse_bytes(unquote(text)).map(DefaultValue::Bytes),
            FieldKind::Date => temporal::parse_date(unquote(text)).map(DefaultValue::Int),
            FieldKind::DateTime => temporal::parse_datetime(unquote(text)).map(DefaultValue::Int),
            FieldKind::Timestamp => {
                temporal::parse_timestamp(unquote(text)).map(DefaultValue::Int)
            }
            FieldKind::TimestampTZ => {
                temporal::parse_timestamptz(unquote(text)).map(DefaultValue::Str)
            }
            FieldKind::Duration => temporal::parse_duration(unquote(text)).map(DefaultValue::Int),
            FieldKind::Ref => None,
        }
    }

    pub(crate) fn hash_into(&self, h: &mut Fnv1a64) {
        match self {
            DefaultValue::Uint(v) => {
                h.write_u8(b'u');
                h.write_u64(*v);
            }
            DefaultValue::Int(v) => {
                h.write_u8(b'i');
                h.write_i64(*v);
            }
            DefaultValue::Float(v) => {
                h.write_u8(b'f');
                h.write_u64(v.to_bits());
            }
            DefaultValue::Bool(v) => {
                h.write_u8(b'b');
                h.write_u8(*v as u8);
            }
            DefaultValue::Str(s) => {
                h.write_u8(b's');
                h.write_u64(s.len() as u64);
                h.write(s.as_bytes());
            }
            DefaultValue::Bytes(b) => {
                h.write_u8(b'x');
                h.write_u64(b.len() as u64);
                h.write(b);
            }
        }
    }
}

impl DefaultDecl {
    pub(crate) fn hash_into(&self, h: &mut Fnv1a64) {
        match self {
            DefaultDecl::Value(v) => v.hash_into(h),
            DefaultDecl::Literal(text) => {
                h.write_u8(b'l');
                h.write_u64(text.len() as u64);
                h.write(text.as_bytes());
            }
        }
    }

    /// Resolve under the field's concrete kind.
    pub fn resolve(&self, kind: FieldKind) -> Option<DefaultValue> {
        match self {
            DefaultDecl::Value(v) if Some(v.column_type()) == kind.column_type() => {
                Some(v.clone())
            }
            DefaultDecl::Value(_) => None,
            DefaultDecl::Literal(text) => DefaultValue::parse_literal(kind, text),
        }
    }

    /// Text used in error messages.
    pub fn display_literal(&self) -> String {
        match self {
            DefaultDecl::Literal(text) => text.clone(),
            DefaultDecl::Value(v) => format!("{:?}", v),
        }
    }
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

fn parse_bytes(text: &str) -> Option<Vec<u8>> {
    let Some(hex) = text.strip_prefix("0x") else {
        return Some(text.as_bytes().to_vec());
    };
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}

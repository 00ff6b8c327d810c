//! Schema model for SCRT
//!
//! This crate defines the types the codec depends on:
//! - FieldKind / ColumnType: declared kinds and their storage classes
//! - Field: typed column declarations, Ref targets, defaults, attributes
//! - Schema: ordered fields with a cached FNV-1a fingerprint and name index
//! - Document: cross-schema Ref resolution and default parsing at finalize
//! - DefaultValue / DefaultDecl: typed and deferred textual defaults
//! - ScrtError: the error taxonomy shared with the codec

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod default;
pub mod document;
pub mod error;
pub mod field;
pub mod fnv;
pub mod kind;
pub mod schema;
pub mod temporal;

pub use default::{DefaultDecl, DefaultValue};
pub use document::Document;
pub use error::{Result, ScrtError};
pub use field::Field;
pub use fnv::Fnv1a64;
pub use kind::{ColumnType, FieldKind};
pub use schema::Schema;

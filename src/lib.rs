//! SCRT - compact self-describing binary columnar records
//!
//! SCRT streams carry typed tabular data as length-prefixed columnar pages
//! behind a header that names the writer's schema fingerprint.
//!
//! # Quick Start
//!
//! ```
//! use scrt::{CodecConfig, Field, FieldKind, Reader, Row, Schema, Writer};
//! use std::sync::Arc;
//!
//! let schema = Schema::new(
//!     "User",
//!     vec![
//!         Field::new("ID", FieldKind::Uint64).auto_increment(),
//!         Field::new("Name", FieldKind::String),
//!     ],
//! );
//! schema.finalize()?;
//! let schema = Arc::new(schema);
//!
//! let mut writer = Writer::new(Vec::new(), Arc::clone(&schema), CodecConfig::default())?;
//! let mut row = Row::new(Arc::clone(&schema));
//! row.set(0, 1u64)?;
//! row.set(1, "ada")?;
//! writer.write_row(&row)?;
//! let bytes = writer.into_inner()?;
//!
//! let mut reader = Reader::new(bytes.as_slice(), schema, CodecConfig::default())?;
//! assert!(reader.read_row(&mut row)?);
//! assert_eq!(row.get_by_name("Name").and_then(|v| v.as_str()), Some("ada"));
//! # Ok::<(), scrt::ScrtError>(())
//! ```
//!
//! # Architecture
//!
//! - [`scrt_core`]: schema model, Ref resolution, fingerprints, errors
//! - [`scrt_codec`]: column encoders, pages, stream writer and reader

pub use scrt_codec::*;
pub use scrt_core::{
    temporal, ColumnType, DefaultDecl, DefaultValue, Document, Field, FieldKind, Fnv1a64, Result,
    Schema, ScrtError,
};

//! Binary columnar codec for SCRT streams
//!
//! This crate turns schema-bound rows into compact byte streams and back:
//!
//! - Varint, zig-zag and presence-bitmap primitives
//! - Column encoders: delta-varint integers, dictionary strings, raw floats,
//!   byte-per-value bools, arena-backed bytes
//! - Page builder and page reader (one self-contained columnar batch each)
//! - Stream writer/reader: header, length-prefixed pages, terminator
//! - Rows, owned and borrowed values, record bindings
//! - Builder pooling and codec configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binding; // Explicit getter/setter record mapping
pub mod bitmap; // Presence bitmaps
pub mod column; // Per-kind column encoders and decoders
pub mod config; // CodecConfig
pub mod header; // Stream header
pub mod page; // Page builder and reader
pub mod pool; // Page builder free list
pub mod reader; // Stream reader
pub mod row; // Schema-bound rows
pub mod stats; // Stream counters
pub mod value; // Owned and borrowed values
pub mod varint; // Varints and the bounds-checked cursor
pub mod writer; // Stream writer

pub use binding::{Accessor, RecordBinding};
pub use config::{CodecConfig, ConfigError};
pub use header::{StreamHeader, STREAM_HEADER_SIZE, STREAM_MAGIC, STREAM_VERSION};
pub use page::{PageBuilder, PageReader, RowView};
pub use pool::BuilderPool;
pub use reader::{Reader, Rows};
pub use row::Row;
pub use stats::StreamStats;
pub use value::{Value, ValueRef};
pub use writer::Writer;

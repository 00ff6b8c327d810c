//! Pages
//!
//! A page is a self-contained column-major batch of up to `row_limit` rows:
//!
//! ```text
//! uvarint rows
//! uvarint columns
//! per column:
//!     uvarint field index
//!     u8      field kind (resolved, never Ref)
//!     uvarint payload length
//!     payload = presence bitmap (ceil(rows / 8) bytes) + column encoding
//! ```
//!
//! Columns are tagged with their field index; decoders dispatch on the tag
//! rather than on position.

mod builder;
mod reader;

pub use self::builder::PageBuilder;
pub use self::reader::{PageReader, RowView};

//! Error types for SCRT
//!
//! Every fallible operation in the schema model and the codec returns
//! [`ScrtError`]. We use `thiserror` for the `Display` and `Error` impls.
//!
//! Decode-time structural errors are unrecoverable for the stream that
//! produced them: callers discard the rest of the stream. End-of-stream is
//! never an error.

use crate::kind::FieldKind;
use std::io;
use thiserror::Error;

/// Result type alias for SCRT operations
pub type Result<T> = std::result::Result<T, ScrtError>;

/// Error types for the SCRT schema model and codec
#[derive(Debug, Error)]
pub enum ScrtError {
    /// I/O error from the underlying reader or writer
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Corrupt magic, length prefix, varint or payload
    #[error("Malformed stream: {0}")]
    MalformedStream(String),

    /// Stream header carries a format version this build cannot decode
    #[error("Unsupported stream version: {0}")]
    UnsupportedVersion(u8),

    /// Stream was written with an incompatible schema
    #[error("Schema fingerprint mismatch: expected {expected:016x}, got {actual:016x}")]
    SchemaFingerprintMismatch {
        /// Fingerprint of the schema bound to the reader or writer
        expected: u64,
        /// Fingerprint found in the stream or row
        actual: u64,
    },

    /// Page or row carries a different number of columns than the schema
    #[error("Column count mismatch: expected {expected}, got {actual}")]
    ColumnCountMismatch {
        /// Number of fields in the schema
        expected: usize,
        /// Number of columns found
        actual: usize,
    },

    /// A field name or index does not exist in the schema
    #[error("Unknown field {field} in schema {schema}")]
    UnknownField {
        /// Schema that was searched
        schema: String,
        /// Field name or index that was not found
        field: String,
    },

    /// A Ref field targets a schema the document does not contain
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    /// Ref resolution revisited a field; carries the traversal path
    #[error("Circular reference: {0}")]
    CircularReference(String),

    /// A default literal cannot be represented in the field's resolved kind
    #[error("Invalid default literal {literal:?} for field {field} of kind {kind}")]
    InvalidDefaultLiteral {
        /// Field carrying the default
        field: String,
        /// Offending literal
        literal: String,
        /// Resolved kind the literal was parsed under
        kind: FieldKind,
    },

    /// Dictionary or arena reference outside its table
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Which table was indexed
        what: &'static str,
        /// Index found in the stream
        index: u64,
        /// Table length
        len: usize,
    },

    /// A value exceeds the arena or length limits of the format
    #[error("Value overflow: {0}")]
    ValueOverflow(String),

    /// An accessor was used on a field of a different kind
    #[error("Kind mismatch on field {field}: expected {expected}, got {actual}")]
    KindMismatch {
        /// Field name
        field: String,
        /// Kind the field stores
        expected: String,
        /// Kind the caller supplied
        actual: String,
    },

    /// Page builder already holds its row limit
    #[error("Page is full")]
    PageFull,

    /// Schema was used before its Document was finalized
    #[error("Schema {0} has not been resolved")]
    UnresolvedSchema(String),

    /// Two schemas with the same name were added to a Document
    #[error("Duplicate schema: {0}")]
    DuplicateSchema(String),

    /// Invalid codec configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid operation or state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl ScrtError {
    /// Shorthand for [`ScrtError::MalformedStream`].
    pub fn malformed(msg: impl Into<String>) -> Self {
        ScrtError::MalformedStream(msg.into())
    }

    /// True for errors that signal corrupt stream bytes.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            ScrtError::MalformedStream(_)
                | ScrtError::IndexOutOfRange { .. }
                | ScrtError::UnsupportedVersion(_)
        )
    }

    /// True for schema resolution and compatibility failures.
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            ScrtError::SchemaFingerprintMismatch { .. }
                | ScrtError::UnknownSchema(_)
                | ScrtError::UnknownField { .. }
                | ScrtError::CircularReference(_)
                | ScrtError::InvalidDefaultLiteral { .. }
                | ScrtError::UnresolvedSchema(_)
        )
    }
}

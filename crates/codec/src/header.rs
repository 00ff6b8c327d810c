//! Stream header
//!
//! Every stream starts with a fixed 13-byte header:
//!
//! ```text
//! ┌──────────┬─────────┬──────────────────────┐
//! │ "SCRT"   │ version │ schema fingerprint   │
//! │ 4 bytes  │ 1 byte  │ 8 bytes, little end. │
//! └──────────┴─────────┴──────────────────────┘
//! ```
//!
//! followed by length-prefixed pages and a zero-length terminator.

use scrt_core::{Result, ScrtError};
use std::io::{self, Read, Write};

/// Magic bytes at the start of every stream: "SCRT"
pub const STREAM_MAGIC: [u8; 4] = *b"SCRT";

/// Current stream format version
pub const STREAM_VERSION: u8 = 2;

/// Size of the stream header in bytes
pub const STREAM_HEADER_SIZE: usize = 13;

/// Decoded stream header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamHeader {
    /// Magic bytes; "SCRT" for a valid stream
    pub magic: [u8; 4],
    /// Format version
    pub version: u8,
    /// Fingerprint of the schema the stream was written with
    pub fingerprint: u64,
}

impl StreamHeader {
    /// Header for a stream written with the schema `fingerprint`.
    pub fn new(fingerprint: u64) -> Self {
        StreamHeader {
            magic: STREAM_MAGIC,
            version: STREAM_VERSION,
            fingerprint,
        }
    }

    /// Serialize header to bytes.
    pub fn to_bytes(&self) -> [u8; STREAM_HEADER_SIZE] {
        let mut bytes = [0u8; STREAM_HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes[5..13].copy_from_slice(&self.fingerprint.to_le_bytes());
        bytes
    }

    /// Deserialize header from bytes. Does not validate.
    pub fn from_bytes(bytes: &[u8; STREAM_HEADER_SIZE]) -> Self {
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        let mut fp = [0u8; 8];
        fp.copy_from_slice(&bytes[5..13]);
        StreamHeader {
            magic,
            version: bytes[4],
            fingerprint: u64::from_le_bytes(fp),
        }
    }

    /// Write the header in one call.
    pub fn write_to<W: Write>(&self, dst: &mut W) -> Result<()> {
        dst.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Read a header. A stream shorter than the header is malformed.
    pub fn read_from<R: Read>(src: &mut R) -> Result<Self> {
        let mut bytes = [0u8; STREAM_HEADER_SIZE];
        match src.read_exact(&mut bytes) {
            Ok(()) => Ok(Self::from_bytes(&bytes)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(ScrtError::malformed("stream shorter than header"))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Check magic and version, then compare the fingerprint against the
    /// reader's schema.
    pub fn validate(&self, expected_fingerprint: u64) -> Result<()> {
        if self.magic != STREAM_MAGIC {
            return Err(ScrtError::malformed(format!(
                "bad magic {:02x?}",
                self.magic
            )));
        }
        if self.version != STREAM_VERSION {
            return Err(ScrtError::UnsupportedVersion(self.version));
        }
        if self.fingerprint != expected_fingerprint {
            return Err(ScrtError::SchemaFingerprintMismatch {
                expected: expected_fingerprint,
                actual: self.fingerprint,
            });
        }
        Ok(())
    }
}

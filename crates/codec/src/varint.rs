//! Varint primitives and a bounds-checked byte cursor
//!
//! Unsigned varints are LEB128 (7 bits per byte, low group first, high bit
//! set on every byte but the last), at most 10 bytes for a `u64`. Signed
//! values are zig-zag mapped first so small negatives stay short.
//!
//! Every read is bounds-checked; truncation or overflow is reported as
//! `MalformedStream`.

use byteorder::{ByteOrder, LittleEndian};
use scrt_core::{Result, ScrtError};
use std::io::{self, Read};

/// Maximum encoded length of a `u64` varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Append `value` as an unsigned varint.
pub fn put_uvarint(dst: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        dst.push((value as u8) | 0x80);
        value >>= 7;
    }
    dst.push(value as u8);
}

/// Append `value` as a zig-zag varint.
pub fn put_varint(dst: &mut Vec<u8>, value: i64) {
    put_uvarint(dst, zigzag_encode(value));
}

/// Encoded length of `value` as an unsigned varint.
pub fn uvarint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    (bits + 6) / 7
}

/// Map a signed integer onto an unsigned one: 0, -1, 1, -2, ... → 0, 1, 2, 3, ...
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode`].
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Decode an unsigned varint from the front of `buf`.
///
/// Returns `(value, bytes_consumed)`.
pub fn decode_uvarint(buf: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if i == MAX_VARINT_LEN {
            return Err(ScrtError::malformed("varint overflows u64"));
        }
        if byte < 0x80 {
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(ScrtError::malformed("varint overflows u64"));
            }
            return Ok((value | (byte as u64) << shift, i + 1));
        }
        value |= ((byte & 0x7f) as u64) << shift;
        shift += 7;
    }
    Err(ScrtError::malformed("truncated varint"))
}

/// Read an unsigned varint from a stream.
///
/// Returns `Ok(None)` when the stream ends before the first byte; a stream
/// that ends inside the varint is malformed.
pub fn read_uvarint<R: Read>(src: &mut R) -> Result<Option<u64>> {
    let mut value: u64 = 0;
    let mut shift = 0;
    for i in 0..MAX_VARINT_LEN {
        let mut byte = [0u8; 1];
        match src.read_exact(&mut byte) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                if i == 0 {
                    return Ok(None);
                }
                return Err(ScrtError::malformed("stream ends inside varint"));
            }
            Err(e) => return Err(e.into()),
        }
        let byte = byte[0];
        if byte < 0x80 {
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(ScrtError::malformed("varint overflows u64"));
            }
            return Ok(Some(value | (byte as u64) << shift));
        }
        value |= ((byte & 0x7f) as u64) << shift;
        shift += 7;
    }
    Err(ScrtError::malformed("varint overflows u64"))
}

/// A byte range inside a page buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    /// Absolute offset of the first byte
    pub offset: usize,
    /// Number of bytes
    pub len: usize,
}

impl Span {
    /// Borrow the bytes this span covers.
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.offset..self.offset + self.len]
    }
}

/// Forward-only reader over a window of a byte buffer.
///
/// Positions are absolute offsets into the underlying buffer, so spans taken
/// from a sub-cursor stay valid for the whole buffer.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> ByteCursor<'a> {
    /// Cursor over the whole of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        ByteCursor {
            buf,
            pos: 0,
            end: buf.len(),
        }
    }

    /// Absolute position of the next byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left in this window.
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    /// Whether the window is exhausted.
    pub fn is_empty(&self) -> bool {
        self.pos == self.end
    }

    /// Split off the next `len` bytes as their own cursor and skip past them.
    pub fn sub(&mut self, len: usize) -> Result<ByteCursor<'a>> {
        let span = self.read_span(len)?;
        Ok(ByteCursor {
            buf: self.buf,
            pos: span.offset,
            end: span.offset + span.len,
        })
    }

    /// Read one byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        if self.pos >= self.end {
            return Err(ScrtError::malformed("unexpected end of page"));
        }
        let b = self.buf[self.pos];
        self.pos += 1;
        Ok(b)
    }

    /// Read an unsigned varint.
    pub fn read_uvarint(&mut self) -> Result<u64> {
        let (value, n) = decode_uvarint(&self.buf[self.pos..self.end])?;
        self.pos += n;
        Ok(value)
    }

    /// Read a zig-zag varint.
    pub fn read_varint(&mut self) -> Result<i64> {
        self.read_uvarint().map(zigzag_decode)
    }

    /// Read a varint length that must fit in the remaining window.
    pub fn read_len(&mut self) -> Result<usize> {
        let len = self.read_uvarint()?;
        if len > self.remaining() as u64 {
            return Err(ScrtError::malformed(format!(
                "length {} exceeds remaining {} bytes",
                len,
                self.remaining()
            )));
        }
        Ok(len as usize)
    }

    /// Validate an element count against the remaining window, given the
    /// minimum encoded size of one element.
    pub fn check_count(&self, count: u64, min_bytes_each: usize) -> Result<usize> {
        let needed = count.saturating_mul(min_bytes_each as u64);
        if needed > self.remaining() as u64 {
            return Err(ScrtError::malformed(format!(
                "count {} cannot fit in {} bytes",
                count,
                self.remaining()
            )));
        }
        Ok(count as usize)
    }

    /// Take the next `len` bytes as a span and skip past them.
    pub fn read_span(&mut self, len: usize) -> Result<Span> {
        if len > self.remaining() {
            return Err(ScrtError::malformed("unexpected end of page"));
        }
        let span = Span {
            offset: self.pos,
            len,
        };
        self.pos += len;
        Ok(span)
    }

    /// Borrow the next `len` bytes and skip past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let span = self.read_span(len)?;
        Ok(span.slice(self.buf))
    }

    /// Read a little-endian IEEE 754 double.
    pub fn read_f64_le(&mut self) -> Result<f64> {
        let bytes = self.read_bytes(8)?;
        Ok(LittleEndian::read_f64(bytes))
    }
}

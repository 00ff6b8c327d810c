//! Page reader (read path).
//!
//! Loads one length-prefixed page into a reusable buffer and decodes every
//! column into typed arrays. String and byte columns keep spans into that
//! buffer; [`RowView`] hands them out as borrows tied to the reader, so they
//! cannot outlive the next page load.

use crate::bitmap;
use crate::column::DecodedValues;
use crate::row::Row;
use crate::value::{Value, ValueRef};
use crate::varint::{read_uvarint, ByteCursor, Span};
use scrt_core::{FieldKind, Result, Schema, ScrtError};
use std::io::{self, Read};
use std::sync::Arc;
use tracing::debug;

/// Decodes pages for one schema, one page at a time.
#[derive(Debug)]
pub struct PageReader {
    schema: Arc<Schema>,
    max_page_bytes: usize,
    kinds: Vec<FieldKind>,
    page: Vec<u8>,
    columns: Vec<DecodedValues>,
    presence: Vec<Span>,
    seen: Vec<bool>,
    rows: usize,
    next_row: usize,
    terminated: bool,
}

impl PageReader {
    /// Reader for a finalized `schema`, rejecting pages above `max_page_bytes`.
    pub fn new(schema: Arc<Schema>, max_page_bytes: usize) -> Result<Self> {
        let mut kinds = Vec::with_capacity(schema.len());
        let mut columns = Vec::with_capacity(schema.len());
        for field in schema.fields() {
            let (kind, column_type) = field
                .value_kind()
                .and_then(|k| Some((k, k.column_type()?)))
                .ok_or_else(|| ScrtError::UnresolvedSchema(schema.name().to_string()))?;
            kinds.push(kind);
            columns.push(DecodedValues::for_type(column_type));
        }
        let fields = schema.len();
        Ok(PageReader {
            schema,
            max_page_bytes,
            kinds,
            page: Vec::new(),
            columns,
            presence: vec![Span::default(); fields],
            seen: vec![false; fields],
            rows: 0,
            next_row: 0,
            terminated: false,
        })
    }

    /// The schema this reader decodes.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Rows in the loaded page.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Rows of the loaded page not yet handed out.
    pub fn remaining(&self) -> usize {
        self.rows - self.next_row
    }

    /// Size of the loaded page in bytes.
    pub fn page_len(&self) -> usize {
        self.page.len()
    }

    /// Whether the last [`load_page`](Self::load_page) hit the zero-length
    /// terminator rather than the end of input.
    pub fn reached_terminator(&self) -> bool {
        self.terminated
    }

    /// Read the next framed page from `src`.
    ///
    /// Returns `Ok(false)` at the zero-length terminator, or when `src` ends
    /// cleanly at a page boundary.
    pub fn load_page<R: Read>(&mut self, src: &mut R) -> Result<bool> {
        self.clear();
        let len = match read_uvarint(src)? {
            None => return Ok(false),
            Some(0) => {
                self.terminated = true;
                return Ok(false);
            }
            Some(len) => len,
        };
        if len > self.max_page_bytes as u64 {
            return Err(ScrtError::malformed(format!(
                "page length {} exceeds limit {}",
                len, self.max_page_bytes
            )));
        }
        self.page.resize(len as usize, 0);
        match src.read_exact(&mut self.page) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                self.page.clear();
                return Err(ScrtError::malformed("stream ends inside page"));
            }
            Err(e) => return Err(e.into()),
        }
        self.decode()?;
        Ok(true)
    }

    /// Decode an unframed page body.
    pub fn load_page_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.clear();
        if bytes.len() > self.max_page_bytes {
            return Err(ScrtError::malformed("page exceeds size limit"));
        }
        self.page.extend_from_slice(bytes);
        self.decode()
    }

    fn clear(&mut self) {
        self.terminated = false;
        self.page.clear();
        self.rows = 0;
        self.next_row = 0;
    }

    fn decode(&mut self) -> Result<()> {
        let result = self.decode_columns();
        if result.is_err() {
            self.rows = 0;
        }
        result
    }

    fn decode_columns(&mut self) -> Result<()> {
        let mut cur = ByteCursor::new(&self.page);
        let rows = cur.read_uvarint()?;
        let columns = cur.read_uvarint()?;
        if columns != self.columns.len() as u64 {
            return Err(ScrtError::ColumnCountMismatch {
                expected: self.columns.len(),
                actual: columns as usize,
            });
        }
        let presence_len = usize::try_from(rows)
            .map(bitmap::byte_len)
            .map_err(|_| ScrtError::malformed("row count overflows"))?;
        for seen in &mut self.seen {
            *seen = false;
        }

        for _ in 0..columns {
            let index = cur.read_uvarint()?;
            let field = usize::try_from(index)
                .ok()
                .filter(|i| *i < self.columns.len())
                .ok_or_else(|| {
                    ScrtError::malformed(format!("column tagged with unknown field {}", index))
                })?;
            if self.seen[field] {
                return Err(ScrtError::malformed(format!("field {} appears twice", field)));
            }
            self.seen[field] = true;

            let kind = cur.read_u8()?;
            if FieldKind::from_u8(kind) != Some(self.kinds[field]) {
                return Err(ScrtError::malformed(format!(
                    "field {} has kind byte {}, schema expects {}",
                    field, kind, self.kinds[field]
                )));
            }

            let len = cur.read_len()?;
            let mut payload = cur.sub(len)?;
            self.presence[field] = payload.read_span(presence_len)?;
            self.columns[field].decode(&mut payload)?;
            if self.columns[field].len() as u64 != rows {
                return Err(ScrtError::malformed(format!(
                    "field {} holds {} values for {} rows",
                    field,
                    self.columns[field].len(),
                    rows
                )));
            }
            if !payload.is_empty() {
                return Err(ScrtError::malformed(format!(
                    "{} trailing bytes in field {}",
                    payload.remaining(),
                    field
                )));
            }
        }
        if !cur.is_empty() {
            return Err(ScrtError::malformed("trailing bytes after last column"));
        }

        // Without columns nothing bounds the row count but the page limit.
        if columns == 0 && rows > self.max_page_bytes as u64 {
            return Err(ScrtError::malformed(format!(
                "row count {} exceeds page limit {}",
                rows, self.max_page_bytes
            )));
        }
        self.rows = rows as usize;
        self.next_row = 0;
        debug!(rows = self.rows, bytes = self.page.len(), "Loaded page");
        Ok(())
    }

    /// Copy the next row into `row`, substituting defaults for fields whose
    /// presence bit is clear. Returns `Ok(false)` once the page is exhausted.
    pub fn read_row(&mut self, row: &mut Row) -> Result<bool> {
        if self.next_row >= self.rows {
            return Ok(false);
        }
        let index = self.next_row;
        self.next_row += 1;
        let view = RowView {
            reader: self,
            row: index,
        };
        for (i, slot) in row.slots_mut().iter_mut().enumerate() {
            match view.get(i)? {
                Some(value) => match slot {
                    Some(existing) => existing.assign(value),
                    None => *slot = Some(value.to_value()),
                },
                None => *slot = None,
            }
        }
        Ok(true)
    }

    /// Borrow the next row. Returns `None` once the page is exhausted.
    pub fn next_view(&mut self) -> Option<RowView<'_>> {
        if self.next_row >= self.rows {
            return None;
        }
        let index = self.next_row;
        self.next_row += 1;
        Some(RowView {
            reader: self,
            row: index,
        })
    }
}

/// A borrowed row of the loaded page.
///
/// String and byte values point into the page buffer; the borrow ends
/// before the reader can load another page.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    reader: &'a PageReader,
    row: usize,
}

impl<'a> RowView<'a> {
    /// The schema of the row.
    pub fn schema(&self) -> &'a Arc<Schema> {
        &self.reader.schema
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.reader.columns.len()
    }

    /// Whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.reader.columns.is_empty()
    }

    /// Whether field `index` was explicitly set when written.
    pub fn is_set(&self, index: usize) -> bool {
        self.reader
            .presence
            .get(index)
            .map_or(false, |span| bitmap::is_set(span.slice(&self.reader.page), self.row))
    }

    /// Value of field `index`: the stored value when set, else the reader's
    /// schema default, else `None`.
    pub fn get(&self, index: usize) -> Result<Option<ValueRef<'a>>> {
        let reader = self.reader;
        let column = reader.columns.get(index).ok_or(ScrtError::IndexOutOfRange {
            what: "field",
            index: index as u64,
            len: reader.columns.len(),
        })?;
        if self.is_set(index) {
            return column.get(&reader.page, self.row).map(Some);
        }
        Ok(reader.schema.fields()[index]
            .default_value()
            .map(ValueRef::from))
    }

    /// Value of a field by name.
    pub fn get_by_name(&self, name: &str) -> Result<Option<ValueRef<'a>>> {
        let index = self
            .reader
            .schema
            .field_index(name)
            .ok_or_else(|| ScrtError::UnknownField {
                schema: self.reader.schema.name().to_string(),
                field: name.to_string(),
            })?;
        self.get(index)
    }

    /// Copy into an owned row.
    pub fn to_row(&self) -> Result<Row> {
        let mut row = Row::new(Arc::clone(&self.reader.schema));
        for (i, slot) in row.slots_mut().iter_mut().enumerate() {
            *slot = self.get(i)?.map(|v| v.to_value());
        }
        Ok(row)
    }

    /// Owned value of field `index`.
    pub fn value(&self, index: usize) -> Result<Option<Value>> {
        Ok(self.get(index)?.map(|v| v.to_value()))
    }
}

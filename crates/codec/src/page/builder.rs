//! Page builder (write path).
//!
//! States: empty, accumulating (append + presence per field, then
//! [`PageBuilder::seal_row`]), full (`rows == row_limit`), then
//! [`PageBuilder::encode`] and [`PageBuilder::reset`] back to empty. Every
//! encoder keeps its capacity across resets.

use crate::bitmap::PresenceBitmap;
use crate::column::{ColumnBuffer, ColumnEncoder};
use crate::row::Row;
use crate::value::ValueRef;
use crate::varint::put_uvarint;
use scrt_core::{FieldKind, Result, Schema, ScrtError};
use std::sync::Arc;

/// Accumulates rows column by column and serializes them as one page.
#[derive(Debug)]
pub struct PageBuilder {
    schema: Arc<Schema>,
    row_limit: usize,
    kinds: Vec<FieldKind>,
    columns: Vec<ColumnBuffer>,
    presence: Vec<PresenceBitmap>,
    rows: usize,
    scratch: Vec<u8>,
}

impl PageBuilder {
    /// Builder for a finalized `schema` holding at most `row_limit` rows.
    pub fn new(schema: Arc<Schema>, row_limit: usize) -> Result<Self> {
        if row_limit == 0 {
            return Err(ScrtError::InvalidConfig(
                "page row limit must be at least 1".into(),
            ));
        }
        let mut kinds = Vec::with_capacity(schema.len());
        let mut columns = Vec::with_capacity(schema.len());
        for field in schema.fields() {
            let (kind, column_type) = field
                .value_kind()
                .and_then(|k| Some((k, k.column_type()?)))
                .ok_or_else(|| ScrtError::UnresolvedSchema(schema.name().to_string()))?;
            kinds.push(kind);
            columns.push(ColumnBuffer::for_type(column_type));
        }
        let presence = (0..schema.len())
            .map(|_| PresenceBitmap::with_capacity(row_limit))
            .collect();
        Ok(PageBuilder {
            schema,
            row_limit,
            kinds,
            columns,
            presence,
            rows: 0,
            scratch: Vec::new(),
        })
    }

    /// The schema this builder encodes.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Maximum rows per page.
    pub fn row_limit(&self) -> usize {
        self.row_limit
    }

    /// Sealed rows in the current page.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Whether the page holds `row_limit` rows.
    pub fn is_full(&self) -> bool {
        self.rows >= self.row_limit
    }

    /// Whether no rows have been sealed.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Append to a Uint64 column.
    pub fn append_uint(&mut self, field: usize, value: u64) -> Result<()> {
        self.append_value(field, ValueRef::Uint(value))
    }

    /// Append to an Int64 or tick-based temporal column.
    pub fn append_int(&mut self, field: usize, value: i64) -> Result<()> {
        self.append_value(field, ValueRef::Int(value))
    }

    /// Append to a Float64 column.
    pub fn append_float(&mut self, field: usize, value: f64) -> Result<()> {
        self.append_value(field, ValueRef::Float(value))
    }

    /// Append to a Bool column.
    pub fn append_bool(&mut self, field: usize, value: bool) -> Result<()> {
        self.append_value(field, ValueRef::Bool(value))
    }

    /// Append to a String or TimestampTZ column.
    pub fn append_str(&mut self, field: usize, value: &str) -> Result<()> {
        self.append_value(field, ValueRef::Str(value))
    }

    /// Append to a Bytes column.
    pub fn append_bytes(&mut self, field: usize, value: &[u8]) -> Result<()> {
        self.append_value(field, ValueRef::Bytes(value))
    }

    /// Append one value for the open row. Each field takes exactly one value
    /// per row, of its own storage class.
    pub fn append_value(&mut self, field: usize, value: ValueRef<'_>) -> Result<()> {
        if self.is_full() {
            return Err(ScrtError::PageFull);
        }
        let rows = self.rows;
        let len = self.columns.len();
        let column = self.columns.get_mut(field).ok_or(ScrtError::IndexOutOfRange {
            what: "field",
            index: field as u64,
            len,
        })?;
        if column.encoder().len() != rows {
            return Err(ScrtError::InvalidOperation(format!(
                "field {} already has a value in this row",
                field
            )));
        }
        match column.append(value) {
            Some(result) => result,
            None => Err(ScrtError::KindMismatch {
                field: self.schema.fields()[field].name().to_string(),
                expected: self.kinds[field].to_string(),
                actual: value.column_type().to_string(),
            }),
        }
    }

    /// Record whether `field` was explicitly set in the open row.
    pub fn record_presence(&mut self, field: usize, present: bool) -> Result<()> {
        let rows = self.rows;
        let len = self.presence.len();
        let bitmap = self.presence.get_mut(field).ok_or(ScrtError::IndexOutOfRange {
            what: "field",
            index: field as u64,
            len,
        })?;
        if bitmap.len() != rows {
            return Err(ScrtError::InvalidOperation(format!(
                "presence of field {} already recorded in this row",
                field
            )));
        }
        bitmap.push(present);
        Ok(())
    }

    /// Close the open row. Every field must have a value and a presence bit.
    pub fn seal_row(&mut self) -> Result<()> {
        if self.is_full() {
            return Err(ScrtError::PageFull);
        }
        let next = self.rows + 1;
        for (i, (column, bitmap)) in self.columns.iter().zip(&self.presence).enumerate() {
            if column.encoder().len() != next || bitmap.len() != next {
                return Err(ScrtError::InvalidOperation(format!(
                    "row is missing field {}",
                    self.schema.fields()[i].name()
                )));
            }
        }
        self.rows = next;
        Ok(())
    }

    /// Discard whatever the open row has appended so far.
    pub fn abort_row(&mut self) {
        let rows = self.rows;
        for column in &mut self.columns {
            column.encoder_mut().truncate(rows);
        }
        for bitmap in &mut self.presence {
            bitmap.truncate(rows);
        }
    }

    /// Append a whole row, substituting the field default (or the zero
    /// value) with a cleared presence bit for unset fields.
    ///
    /// On error the partial row is rolled back and the page is unchanged.
    pub fn append_row(&mut self, row: &Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ScrtError::ColumnCountMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        if self.is_full() {
            return Err(ScrtError::PageFull);
        }
        let result = self.append_slots(row);
        if result.is_err() {
            self.abort_row();
        }
        result
    }

    fn append_slots(&mut self, row: &Row) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        for (i, (slot, field)) in row.slots().iter().zip(schema.fields()).enumerate() {
            match slot {
                Some(value) => {
                    self.append_value(i, value.as_ref())?;
                    self.record_presence(i, true)?;
                }
                None => {
                    let placeholder = match field.default_value() {
                        Some(default) => ValueRef::from(default),
                        None => ValueRef::zero(self.columns[i].column_type()),
                    };
                    self.append_value(i, placeholder)?;
                    self.record_presence(i, false)?;
                }
            }
        }
        self.seal_row()
    }

    /// Serialize the sealed rows into `dst`. Writes nothing for an empty page.
    pub fn encode(&mut self, dst: &mut Vec<u8>) -> Result<()> {
        let open_row = self
            .columns
            .iter()
            .any(|c| c.encoder().len() != self.rows)
            || self.presence.iter().any(|b| b.len() != self.rows);
        if open_row {
            return Err(ScrtError::InvalidOperation(
                "cannot encode a page with an unsealed row".into(),
            ));
        }
        if self.rows == 0 {
            return Ok(());
        }

        put_uvarint(dst, self.rows as u64);
        put_uvarint(dst, self.columns.len() as u64);
        for (i, column) in self.columns.iter().enumerate() {
            self.scratch.clear();
            self.scratch.extend_from_slice(self.presence[i].as_bytes());
            column.encoder().encode(&mut self.scratch);

            put_uvarint(dst, i as u64);
            dst.push(self.kinds[i].as_u8());
            put_uvarint(dst, self.scratch.len() as u64);
            dst.extend_from_slice(&self.scratch);
        }
        Ok(())
    }

    /// Drop all rows, keeping allocated capacity.
    pub fn reset(&mut self) {
        for column in &mut self.columns {
            column.encoder_mut().reset();
        }
        for bitmap in &mut self.presence {
            bitmap.clear();
        }
        self.rows = 0;
    }
}

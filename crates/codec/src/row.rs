//! Schema-bound rows
//!
//! A [`Row`] holds one optional [`Value`] per schema field. An unset slot is
//! what drives default substitution and the presence bit; a row is reused
//! across reads via [`Row::reset`] and never rebound to another schema.

use crate::value::Value;
use scrt_core::{Result, Schema, ScrtError};
use std::sync::Arc;

/// A mutable record bound to one schema.
#[derive(Debug, Clone)]
pub struct Row {
    schema: Arc<Schema>,
    values: Vec<Option<Value>>,
}

impl Row {
    /// Empty row for `schema`; every field starts unset.
    pub fn new(schema: Arc<Schema>) -> Self {
        let values = vec![None; schema.len()];
        Row { schema, values }
    }

    /// The bound schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Set field `index`.
    ///
    /// The value's storage class must match the field's resolved kind.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        let field = self
            .schema
            .field(index)
            .ok_or(ScrtError::IndexOutOfRange {
                what: "field",
                index: index as u64,
                len: self.values.len(),
            })?;
        let expected = field
            .column_type()
            .ok_or_else(|| ScrtError::UnresolvedSchema(self.schema.name().to_string()))?;
        if value.column_type() != expected {
            return Err(ScrtError::KindMismatch {
                field: field.name().to_string(),
                expected: expected.to_string(),
                actual: value.column_type().to_string(),
            });
        }
        self.values[index] = Some(value);
        Ok(())
    }

    /// Set a field by name.
    pub fn set_by_name(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let index = self.index_of(name)?;
        self.set(index, value)
    }

    /// Value of field `index`, if set.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index).and_then(Option::as_ref)
    }

    /// Value of a field by name, if the field exists and is set.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.schema.field_index(name).and_then(|i| self.get(i))
    }

    /// Whether field `index` is set.
    pub fn is_set(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Clear one field.
    pub fn unset(&mut self, index: usize) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = None;
        }
    }

    /// Clear every field.
    pub fn reset(&mut self) {
        for slot in &mut self.values {
            *slot = None;
        }
    }

    fn index_of(&self, name: &str) -> Result<usize> {
        self.schema
            .field_index(name)
            .ok_or_else(|| ScrtError::UnknownField {
                schema: self.schema.name().to_string(),
                field: name.to_string(),
            })
    }

    pub(crate) fn slots(&self) -> &[Option<Value>] {
        &self.values
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Option<Value>] {
        &mut self.values
    }
}

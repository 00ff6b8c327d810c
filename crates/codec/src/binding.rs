//! Record bindings
//!
//! A [`RecordBinding`] maps an application type onto a schema with explicit
//! getter/setter pairs. Names are resolved to field positions once, when the
//! binding is built; callers build a binding per (type, schema) pair and keep
//! it around.

use crate::row::Row;
use crate::value::Value;
use scrt_core::{Result, Schema, ScrtError};
use std::fmt;
use std::sync::Arc;

/// Getter/setter pair for one field of `T`.
pub struct Accessor<T> {
    /// Read the field from a record; `None` leaves the field unset.
    pub get: fn(&T) -> Option<Value>,
    /// Store a decoded value into a record.
    pub set: fn(&mut T, &Value),
}

impl<T> Accessor<T> {
    /// Accessor from a getter and a setter.
    pub fn new(get: fn(&T) -> Option<Value>, set: fn(&mut T, &Value)) -> Self {
        Accessor { get, set }
    }
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Accessor<T> {}

impl<T> fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor").finish_non_exhaustive()
    }
}

/// Positional accessors for `T` against one schema.
#[derive(Debug, Clone)]
pub struct RecordBinding<T> {
    schema: Arc<Schema>,
    accessors: Vec<Option<Accessor<T>>>,
}

impl<T> RecordBinding<T> {
    /// Bind named accessors to `schema`. Fields without an accessor stay
    /// unset on write and are ignored on read.
    pub fn new<'n>(
        schema: Arc<Schema>,
        fields: impl IntoIterator<Item = (&'n str, Accessor<T>)>,
    ) -> Result<Self> {
        let mut accessors = vec![None; schema.len()];
        for (name, accessor) in fields {
            let index = schema
                .field_index(name)
                .ok_or_else(|| ScrtError::UnknownField {
                    schema: schema.name().to_string(),
                    field: name.to_string(),
                })?;
            accessors[index] = Some(accessor);
        }
        Ok(RecordBinding { schema, accessors })
    }

    /// The bound schema.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Number of fields with an accessor.
    pub fn bound_fields(&self) -> usize {
        self.accessors.iter().filter(|a| a.is_some()).count()
    }

    /// Reset `row` and fill it from `record`.
    pub fn fill_row(&self, record: &T, row: &mut Row) -> Result<()> {
        row.reset();
        for (i, accessor) in self.accessors.iter().enumerate() {
            if let Some(accessor) = accessor {
                if let Some(value) = (accessor.get)(record) {
                    row.set(i, value)?;
                }
            }
        }
        Ok(())
    }

    /// Copy every set field of `row` into `record`.
    pub fn apply_row(&self, row: &Row, record: &mut T) {
        for (i, accessor) in self.accessors.iter().enumerate() {
            if let (Some(accessor), Some(value)) = (accessor, row.get(i)) {
                (accessor.set)(record, value);
            }
        }
    }
}

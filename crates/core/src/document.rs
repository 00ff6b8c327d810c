//! Documents and cross-schema resolution
//!
//! A [`Document`] groups the schemas of one source unit so Ref fields can
//! find their targets. Resolution runs once, at [`Document::finalize`]:
//!
//! - non-Ref fields resolve to their own kind;
//! - Ref fields follow `target_schema.target_field`, transitively, with a
//!   per-traversal visited list keyed by `"schema.field"` so chains that loop
//!   fail with `CircularReference` instead of recursing forever;
//! - once the concrete kind is known, any textual default is parsed under it.
//!
//! Results are committed to the fields only when every field of every schema
//! resolved, so a failed finalize leaves nothing half-resolved.

use crate::error::{Result, ScrtError};
use crate::field::Resolution;
use crate::kind::FieldKind;
use crate::schema::Schema;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// A named collection of schemas that may reference each other.
#[derive(Debug, Default)]
pub struct Document {
    schemas: BTreeMap<String, Arc<Schema>>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema. Names must be unique within the document.
    pub fn add(&mut self, schema: Schema) -> Result<Arc<Schema>> {
        if self.schemas.contains_key(schema.name()) {
            return Err(ScrtError::DuplicateSchema(schema.name().to_string()));
        }
        let schema = Arc::new(schema);
        self.schemas
            .insert(schema.name().to_string(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Builder-style [`Document::add`].
    pub fn with_schema(mut self, schema: Schema) -> Result<Self> {
        self.add(schema)?;
        Ok(self)
    }

    /// Shared handle to the schema called `name`.
    pub fn schema(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    /// Borrow the schema called `name`.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name).map(|s| s.as_ref())
    }

    /// Schemas in name order.
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.values()
    }

    /// Number of schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the document is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Resolve the storage kind of `schema.fields()[index]` against this
    /// document.
    pub fn resolve_field_kind(&self, schema: &Schema, index: usize) -> Result<FieldKind> {
        resolve_kind(&|name: &str| self.get(name), schema, index, &mut Vec::new())
    }

    /// Resolve every field of every schema.
    pub fn finalize(&self) -> Result<()> {
        resolve_all(
            &|name: &str| self.get(name),
            self.schemas.values().map(|s| s.as_ref()),
        )?;
        debug!(schemas = self.schemas.len(), "Document finalized");
        Ok(())
    }
}

pub(crate) fn resolve_all<'a, L>(lookup: &L, schemas: impl Iterator<Item = &'a Schema>) -> Result<()>
where
    L: Fn(&str) -> Option<&'a Schema>,
{
    let mut pending = Vec::new();
    for schema in schemas {
        for (index, field) in schema.fields().iter().enumerate() {
            let value_kind = resolve_kind(lookup, schema, index, &mut Vec::new())?;
            let default = match field.default_decl() {
                None => None,
                Some(decl) => Some(decl.resolve(value_kind).ok_or_else(|| {
                    ScrtError::InvalidDefaultLiteral {
                        field: format!("{}.{}", schema.name(), field.name()),
                        literal: decl.display_literal(),
                        kind: value_kind,
                    }
                })?),
            };
            pending.push((field, Resolution { value_kind, default }));
        }
    }
    for (field, resolution) in pending {
        field.resolve_with(resolution);
    }
    Ok(())
}

fn resolve_kind<'a, L>(
    lookup: &L,
    schema: &Schema,
    index: usize,
    visited: &mut Vec<String>,
) -> Result<FieldKind>
where
    L: Fn(&str) -> Option<&'a Schema>,
{
    let field = schema.field(index).ok_or_else(|| ScrtError::UnknownField {
        schema: schema.name().to_string(),
        field: index.to_string(),
    })?;
    if field.kind() != FieldKind::Ref {
        return Ok(field.kind());
    }

    let key = format!("{}.{}", schema.name(), field.name());
    let seen = visited.contains(&key);
    visited.push(key);
    if seen {
        return Err(ScrtError::CircularReference(visited.join(" -> ")));
    }

    let (target_schema, target_field) = field
        .target()
        .ok_or_else(|| ScrtError::UnknownSchema(String::new()))?;
    let target = lookup(target_schema)
        .ok_or_else(|| ScrtError::UnknownSchema(target_schema.to_string()))?;
    let target_index = target
        .field_index(target_field)
        .ok_or_else(|| ScrtError::UnknownField {
            schema: target_schema.to_string(),
            field: target_field.to_string(),
        })?;
    resolve_kind(lookup, target, target_index, visited)
}

//! Schema definition and fingerprinting
//!
//! A [`Schema`] is an ordered list of fields. Once published it is shared
//! read-only across many writers and readers, so the two derived caches
//! (fingerprint and name index) are populated with `OnceCell`: concurrent
//! first callers race to compute, exactly one result is kept, and every
//! later call is a plain load.
//!
//! # Fingerprint
//!
//! FNV-1a 64 over the schema name followed by, for each field in
//! declaration order: name, raw type, kind byte, target schema and field,
//! auto-increment marker, attributes in lexicographic order, and a
//! type-tagged encoding of the default. Equal fingerprints are the only
//! recognized wire-compatible pair.

use crate::document::resolve_all;
use crate::error::Result;
use crate::field::Field;
use crate::fnv::Fnv1a64;
use crate::kind::FieldKind;
use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::hash::Hasher;

/// An ordered set of typed fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
    #[serde(skip)]
    fingerprint: OnceCell<u64>,
    #[serde(skip)]
    field_index: OnceCell<FxHashMap<String, usize>>,
}

impl Schema {
    /// Create a schema from its fields in declaration order.
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Schema {
            name: name.into(),
            fields,
            fingerprint: OnceCell::new(),
            field_index: OnceCell::new(),
        }
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Field at `index`.
    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Position of the field called `name`.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.field_index
            .get_or_init(|| {
                self.fields
                    .iter()
                    .enumerate()
                    .map(|(i, f)| (f.name().to_string(), i))
                    .collect()
            })
            .get(name)
            .copied()
    }

    /// Field called `name`.
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.field_index(name).and_then(|i| self.fields.get(i))
    }

    /// Resolved value kind of the field at `index`.
    pub fn value_kind(&self, index: usize) -> Option<FieldKind> {
        self.fields.get(index).and_then(Field::value_kind)
    }

    /// Content fingerprint, computed on first use.
    pub fn fingerprint(&self) -> u64 {
        *self.fingerprint.get_or_init(|| self.compute_fingerprint())
    }

    fn compute_fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new();
        h.write_str(&self.name);
        h.write_u64(self.fields.len() as u64);
        for field in &self.fields {
            field.hash_into(&mut h);
        }
        h.finish()
    }

    /// Whether every field has a resolved value kind.
    pub fn is_resolved(&self) -> bool {
        self.fields.iter().all(Field::is_resolved)
    }

    /// Resolve a schema that stands alone: Ref fields may only target fields
    /// of this same schema.
    pub fn finalize(&self) -> Result<()> {
        resolve_all(
            &|name: &str| (name == self.name).then_some(self),
            std::iter::once(self),
        )
    }
}

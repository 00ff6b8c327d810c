//! Field declarations
//!
//! A [`Field`] is immutable once its schema is published. The only state
//! that appears later is the resolution (value kind and parsed default),
//! which is computed once at finalize time and memoized.

use crate::default::{DefaultDecl, DefaultValue};
use crate::fnv::Fnv1a64;
use crate::kind::{ColumnType, FieldKind};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::hash::Hasher;

/// Resolved storage information for a field.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Resolution {
    pub(crate) value_kind: FieldKind,
    pub(crate) default: Option<DefaultValue>,
}

/// A typed column declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    name: String,
    kind: FieldKind,
    raw_type: String,
    target_schema: Option<String>,
    target_field: Option<String>,
    auto_increment: bool,
    attributes: BTreeSet<String>,
    default: Option<DefaultDecl>,
    #[serde(skip)]
    resolved: OnceCell<Resolution>,
}

impl Field {
    /// Declare a field of a concrete kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Field {
            name: name.into(),
            kind,
            raw_type: kind.name().to_string(),
            target_schema: None,
            target_field: None,
            auto_increment: false,
            attributes: BTreeSet::new(),
            default: None,
            resolved: OnceCell::new(),
        }
    }

    /// Declare a Ref field whose storage follows `target_schema.target_field`.
    pub fn reference(
        name: impl Into<String>,
        target_schema: impl Into<String>,
        target_field: impl Into<String>,
    ) -> Self {
        let target_schema = target_schema.into();
        let target_field = target_field.into();
        let mut field = Field::new(name, FieldKind::Ref);
        field.raw_type = format!("ref:{}.{}", target_schema, target_field);
        field.target_schema = Some(target_schema);
        field.target_field = Some(target_field);
        field
    }

    /// Mark the field auto-increment (assigned by the storage backend).
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Add a free-form attribute.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.insert(attribute.into());
        self
    }

    /// Set a typed default.
    pub fn with_default(mut self, value: DefaultValue) -> Self {
        self.default = Some(DefaultDecl::Value(value));
        self
    }

    /// Set a textual default, parsed when the field kind is resolved.
    pub fn with_default_literal(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(DefaultDecl::Literal(literal.into()));
        self
    }

    /// Override the type text as written in schema source.
    pub fn with_raw_type(mut self, raw_type: impl Into<String>) -> Self {
        self.raw_type = raw_type.into();
        self
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kind (may be `Ref`).
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Type text as written in schema source.
    pub fn raw_type(&self) -> &str {
        &self.raw_type
    }

    /// Ref target as `(schema, field)`.
    pub fn target(&self) -> Option<(&str, &str)> {
        match (&self.target_schema, &self.target_field) {
            (Some(s), Some(f)) => Some((s.as_str(), f.as_str())),
            _ => None,
        }
    }

    /// Whether the field is auto-increment.
    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    /// Attributes in lexicographic order.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }

    /// Whether the field carries `attribute`.
    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.contains(attribute)
    }

    /// Default as declared.
    pub fn default_decl(&self) -> Option<&DefaultDecl> {
        self.default.as_ref()
    }

    /// Resolved value kind; never `Ref`. `None` until finalized.
    pub fn value_kind(&self) -> Option<FieldKind> {
        self.resolved.get().map(|r| r.value_kind)
    }

    /// Storage class of the resolved kind.
    pub fn column_type(&self) -> Option<ColumnType> {
        self.value_kind().and_then(FieldKind::column_type)
    }

    /// Resolved default. `None` when the field has no default or is not
    /// finalized yet.
    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.resolved.get().and_then(|r| r.default.as_ref())
    }

    /// Whether the field has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.resolved.get().is_some()
    }

    pub(crate) fn resolve_with(&self, resolution: Resolution) {
        // First resolution wins; resolution is deterministic so a second
        // finalize computes the same value.
        let _ = self.resolved.set(resolution);
    }

    pub(crate) fn hash_into(&self, h: &mut Fnv1a64) {
        h.write_str(&self.name);
        h.write_str(&self.raw_type);
        h.write_u8(self.kind.as_u8());
        h.write_str(self.target_schema.as_deref().unwrap_or(""));
        h.write_str(self.target_field.as_deref().unwrap_or(""));
        h.write_u8(self.auto_increment as u8);
        h.write_u64(self.attributes.len() as u64);
        for attribute in &self.attributes {
            h.write_str(attribute);
        }
        match &self.default {
            None => h.write_u8(0),
            Some(decl) => {
                h.write_u8(1);
                decl.hash_into(h);
            }
        }
    }
}

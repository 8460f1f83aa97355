//! Struct values and their backing representations.
//!
//! A struct is either a reflective record ([`RecordRef`]) or a
//! caller-supplied [`CustomStruct`]. The record backend is the common
//! case and is dispatched statically; custom structs go through a trait
//! object.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use quill_reflect::{records_equal, RecordRef};

use crate::convert::{field_to_value, ConvertOptions};
use crate::equality::heterogeneous_equal;
use crate::error::RuntimeError;
use crate::value::Value;

/// An extension point for struct values not backed by a reflective
/// record.
pub trait CustomStruct: fmt::Debug + Send + Sync {
    fn type_name(&self) -> &str;

    /// Every field this struct declares, set or not.
    fn field_names(&self) -> Vec<String>;

    fn get_field(&self, name: &str) -> Result<Value, RuntimeError>;

    fn has_field(&self, name: &str) -> Result<bool, RuntimeError>;

    /// Type-specific equality. `None` falls back to the generic
    /// field-by-field comparison.
    fn fast_equals(&self, _other: &dyn CustomStruct) -> Option<bool> {
        None
    }

    /// A reflective view of this struct, when one exists.
    fn as_record(&self) -> Option<RecordRef> {
        None
    }
}

#[derive(Clone)]
pub enum StructValue {
    Message(RecordRef),
    Custom(Arc<dyn CustomStruct>),
}

impl StructValue {
    pub fn message(record: RecordRef) -> Self {
        StructValue::Message(record)
    }

    pub fn custom(value: impl CustomStruct + 'static) -> Self {
        StructValue::Custom(Arc::new(value))
    }

    pub fn type_name(&self) -> &str {
        match self {
            StructValue::Message(record) => record.descriptor().full_name(),
            StructValue::Custom(custom) => custom.type_name(),
        }
    }

    pub fn field_names(&self) -> Vec<String> {
        match self {
            StructValue::Message(record) => record
                .descriptor()
                .fields()
                .iter()
                .map(|field| field.name.clone())
                .collect(),
            StructValue::Custom(custom) => custom.field_names(),
        }
    }

    pub fn get_field(&self, name: &str) -> Result<Value, RuntimeError> {
        self.get_field_with(name, &ConvertOptions::default())
    }

    pub fn get_field_with(&self, name: &str, options: &ConvertOptions) -> Result<Value, RuntimeError> {
        match self {
            StructValue::Message(record) => {
                let field = record
                    .descriptor()
                    .find_field_by_name(name)
                    .ok_or_else(|| RuntimeError::no_such_field(self.type_name(), name))?;
                Ok(field_to_value(record.as_ref(), field, options))
            }
            StructValue::Custom(custom) => custom.get_field(name),
        }
    }

    pub fn has_field(&self, name: &str) -> Result<bool, RuntimeError> {
        match self {
            StructValue::Message(record) => {
                let field = record
                    .descriptor()
                    .find_field_by_name(name)
                    .ok_or_else(|| RuntimeError::no_such_field(self.type_name(), name))?;
                Ok(record.has_field(field))
            }
            StructValue::Custom(custom) => custom.has_field(name),
        }
    }

    /// The backing record, if this struct has a reflective view.
    pub fn as_record(&self) -> Option<RecordRef> {
        match self {
            StructValue::Message(record) => Some(Arc::clone(record)),
            StructValue::Custom(custom) => custom.as_record(),
        }
    }

    pub fn ptr_eq(&self, other: &StructValue) -> bool {
        match (self, other) {
            (StructValue::Message(a), StructValue::Message(b)) => Arc::ptr_eq(a, b),
            (StructValue::Custom(a), StructValue::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for StructValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructValue::Message(record) => fmt::Debug::fmt(record, f),
            StructValue::Custom(custom) => fmt::Debug::fmt(custom, f),
        }
    }
}

impl TryFrom<Value> for StructValue {
    type Error = RuntimeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Struct(s) => Ok(s),
            other => Err(RuntimeError::unsupported_conversion(&other.type_name(), "struct")),
        }
    }
}

// ──────────────────────────────────────────────
// Equality
// ──────────────────────────────────────────────

/// Struct equality. Records compare field by field through their
/// descriptors; custom structs use their fast path when they have one,
/// otherwise the generic comparator.
pub(crate) fn struct_equal(a: &StructValue, b: &StructValue) -> Option<bool> {
    if a.ptr_eq(b) {
        return Some(true);
    }
    match (a, b) {
        (StructValue::Message(x), StructValue::Message(y)) => {
            Some(records_equal(x.as_ref(), y.as_ref()))
        }
        (StructValue::Custom(x), StructValue::Custom(y)) => match x.fast_equals(y.as_ref()) {
            Some(result) => Some(result),
            None => generic_equal(a, b),
        },
        _ => generic_equal(a, b),
    }
}

fn generic_equal(a: &StructValue, b: &StructValue) -> Option<bool> {
    if a.type_name() != b.type_name() {
        return Some(false);
    }
    let names: BTreeSet<String> = a.field_names().into_iter().collect();
    if names != b.field_names().into_iter().collect::<BTreeSet<_>>() {
        return Some(false);
    }
    let mut undefined = false;
    let mut equal = true;
    for name in &names {
        let lhs = a.get_field(name).unwrap_or_else(Value::error);
        let rhs = b.get_field(name).unwrap_or_else(Value::error);
        match heterogeneous_equal(&lhs, &rhs) {
            None => undefined = true,
            Some(false) => equal = false,
            Some(true) => {}
        }
    }
    if undefined {
        None
    } else {
        Some(equal)
    }
}

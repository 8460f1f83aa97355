//! The reflective record interface.
//!
//! A [`Record`] exposes its fields by number through its
//! [`MessageDescriptor`], so callers can walk any schema without knowing it
//! at compile time.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::{FieldDescriptor, FieldKind, MapKeyType, MessageDescriptor};

/// Shared handle to a record. Records are immutable once shared.
pub type RecordRef = Arc<dyn Record>;

// ──────────────────────────────────────────────
// Field values
// ──────────────────────────────────────────────

/// A single field element as stored in a record.
#[derive(Debug, Clone)]
pub enum ScalarValue {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Enum(i32),
    Message(RecordRef),
}

impl ScalarValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            ScalarValue::Bool(_) => "bool",
            ScalarValue::Int32(_) => "int32",
            ScalarValue::Int64(_) => "int64",
            ScalarValue::Uint32(_) => "uint32",
            ScalarValue::Uint64(_) => "uint64",
            ScalarValue::Float(_) => "float",
            ScalarValue::Double(_) => "double",
            ScalarValue::String(_) => "string",
            ScalarValue::Bytes(_) => "bytes",
            ScalarValue::Enum(_) => "enum",
            ScalarValue::Message(_) => "message",
        }
    }

    /// Zero value for a field kind. Message kinds have no scalar default.
    pub fn default_for(kind: &FieldKind) -> Option<ScalarValue> {
        match kind {
            FieldKind::Bool => Some(ScalarValue::Bool(false)),
            FieldKind::Int32 => Some(ScalarValue::Int32(0)),
            FieldKind::Int64 => Some(ScalarValue::Int64(0)),
            FieldKind::Uint32 => Some(ScalarValue::Uint32(0)),
            FieldKind::Uint64 => Some(ScalarValue::Uint64(0)),
            FieldKind::Float => Some(ScalarValue::Float(0.0)),
            FieldKind::Double => Some(ScalarValue::Double(0.0)),
            FieldKind::String => Some(ScalarValue::String(String::new())),
            FieldKind::Bytes => Some(ScalarValue::Bytes(Vec::new())),
            FieldKind::Enum { .. } => Some(ScalarValue::Enum(0)),
            FieldKind::Message { .. } => None,
        }
    }

    pub fn is_default(&self) -> bool {
        match self {
            ScalarValue::Bool(b) => !*b,
            ScalarValue::Int32(v) | ScalarValue::Enum(v) => *v == 0,
            ScalarValue::Int64(v) => *v == 0,
            ScalarValue::Uint32(v) => *v == 0,
            ScalarValue::Uint64(v) => *v == 0,
            ScalarValue::Float(v) => *v == 0.0,
            ScalarValue::Double(v) => *v == 0.0,
            ScalarValue::String(s) => s.is_empty(),
            ScalarValue::Bytes(b) => b.is_empty(),
            ScalarValue::Message(_) => false,
        }
    }

    /// Whether this value may be stored in a field of the given kind.
    pub fn fits(&self, kind: &FieldKind) -> bool {
        match (self, kind) {
            (ScalarValue::Bool(_), FieldKind::Bool)
            | (ScalarValue::Int32(_), FieldKind::Int32)
            | (ScalarValue::Int64(_), FieldKind::Int64)
            | (ScalarValue::Uint32(_), FieldKind::Uint32)
            | (ScalarValue::Uint64(_), FieldKind::Uint64)
            | (ScalarValue::Float(_), FieldKind::Float)
            | (ScalarValue::Double(_), FieldKind::Double)
            | (ScalarValue::String(_), FieldKind::String)
            | (ScalarValue::Bytes(_), FieldKind::Bytes)
            | (ScalarValue::Enum(_), FieldKind::Enum { .. }) => true,
            (ScalarValue::Message(record), FieldKind::Message { type_name }) => {
                record.descriptor().full_name() == type_name
            }
            _ => false,
        }
    }
}

impl PartialEq for ScalarValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ScalarValue::Bool(a), ScalarValue::Bool(b)) => a == b,
            (ScalarValue::Int32(a), ScalarValue::Int32(b)) => a == b,
            (ScalarValue::Int64(a), ScalarValue::Int64(b)) => a == b,
            (ScalarValue::Uint32(a), ScalarValue::Uint32(b)) => a == b,
            (ScalarValue::Uint64(a), ScalarValue::Uint64(b)) => a == b,
            (ScalarValue::Float(a), ScalarValue::Float(b)) => a == b,
            (ScalarValue::Double(a), ScalarValue::Double(b)) => a == b,
            (ScalarValue::String(a), ScalarValue::String(b)) => a == b,
            (ScalarValue::Bytes(a), ScalarValue::Bytes(b)) => a == b,
            (ScalarValue::Enum(a), ScalarValue::Enum(b)) => a == b,
            (ScalarValue::Message(a), ScalarValue::Message(b)) => {
                Arc::ptr_eq(a, b) || records_equal(a.as_ref(), b.as_ref())
            }
            _ => false,
        }
    }
}

/// Key of a map field entry, typed by the map's declared key type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapKey {
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Uint32(u32),
    Uint64(u64),
    String(String),
}

impl MapKey {
    pub fn key_type(&self) -> MapKeyType {
        match self {
            MapKey::Bool(_) => MapKeyType::Bool,
            MapKey::Int32(_) => MapKeyType::Int32,
            MapKey::Int64(_) => MapKeyType::Int64,
            MapKey::Uint32(_) => MapKeyType::Uint32,
            MapKey::Uint64(_) => MapKeyType::Uint64,
            MapKey::String(_) => MapKeyType::String,
        }
    }

    /// Parse a key from its textual form (JSON object keys are strings).
    pub fn parse(key_type: MapKeyType, text: &str) -> Option<MapKey> {
        match key_type {
            MapKeyType::Bool => text.parse().ok().map(MapKey::Bool),
            MapKeyType::Int32 => text.parse().ok().map(MapKey::Int32),
            MapKeyType::Int64 => text.parse().ok().map(MapKey::Int64),
            MapKeyType::Uint32 => text.parse().ok().map(MapKey::Uint32),
            MapKeyType::Uint64 => text.parse().ok().map(MapKey::Uint64),
            MapKeyType::String => Some(MapKey::String(text.to_string())),
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Bool(v) => write!(f, "{}", v),
            MapKey::Int32(v) => write!(f, "{}", v),
            MapKey::Int64(v) => write!(f, "{}", v),
            MapKey::Uint32(v) => write!(f, "{}u", v),
            MapKey::Uint64(v) => write!(f, "{}u", v),
            MapKey::String(v) => write!(f, "{:?}", v),
        }
    }
}

/// The stored content of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Singular(ScalarValue),
    Repeated(Vec<ScalarValue>),
    Map(BTreeMap<MapKey, ScalarValue>),
}

// ──────────────────────────────────────────────
// Record trait
// ──────────────────────────────────────────────

/// A schema-described record whose fields are reachable by number.
///
/// Implementations must be safe to read from several threads at once;
/// the engine never mutates a record it was handed.
pub trait Record: fmt::Debug + Send + Sync {
    fn descriptor(&self) -> &Arc<MessageDescriptor>;

    /// The stored content of a field, or `None` when it was never set.
    fn field(&self, number: u32) -> Option<&FieldValue>;

    /// An empty record of the field's message type, used as the value of
    /// an unset singular message field.
    fn empty_message(&self, field: &FieldDescriptor) -> Option<RecordRef>;

    /// Presence test: containers are present when non-empty; fields with
    /// explicit presence when set; other scalars when set to a
    /// non-default value.
    fn has_field(&self, field: &FieldDescriptor) -> bool {
        match self.field(field.number) {
            None => false,
            Some(FieldValue::Repeated(items)) => !items.is_empty(),
            Some(FieldValue::Map(entries)) => !entries.is_empty(),
            Some(FieldValue::Singular(value)) => field.has_presence() || !value.is_default(),
        }
    }

    /// Value of a singular field, falling back to its default when unset.
    fn singular(&self, field: &FieldDescriptor) -> Option<ScalarValue> {
        match self.field(field.number) {
            Some(FieldValue::Singular(value)) => Some(value.clone()),
            Some(_) => None,
            None => ScalarValue::default_for(&field.kind)
                .or_else(|| self.empty_message(field).map(ScalarValue::Message)),
        }
    }

    fn repeated(&self, field: &FieldDescriptor) -> &[ScalarValue] {
        match self.field(field.number) {
            Some(FieldValue::Repeated(items)) => items.as_slice(),
            _ => &[],
        }
    }

    fn map_entries(&self, field: &FieldDescriptor) -> Option<&BTreeMap<MapKey, ScalarValue>> {
        match self.field(field.number) {
            Some(FieldValue::Map(entries)) => Some(entries),
            _ => None,
        }
    }
}

/// Field-by-field comparison of two records.
///
/// Records of different types are never equal. Unset fields compare as
/// their defaults, so a field explicitly set to its default equals an
/// unset one.
pub fn records_equal(a: &dyn Record, b: &dyn Record) -> bool {
    let desc = a.descriptor();
    if desc.full_name() != b.descriptor().full_name() {
        return false;
    }
    desc.fields().iter().all(|field| {
        if field.is_map() {
            let empty = BTreeMap::new();
            let lhs = a.map_entries(field).unwrap_or(&empty);
            let rhs = b.map_entries(field).unwrap_or(&empty);
            lhs == rhs
        } else if field.is_repeated() {
            a.repeated(field) == b.repeated(field)
        } else if field.has_presence() {
            match (a.has_field(field), b.has_field(field)) {
                (false, false) => true,
                (true, true) => a.singular(field) == b.singular(field),
                _ => false,
            }
        } else {
            a.singular(field) == b.singular(field)
        }
    })
}

//! The legacy value representation.
//!
//! Older call sites exchange values in this shape: strings and bytes as
//! plain shared slices, errors as status records, and containers either
//! as views over modern [`ListValue`]/[`MapValue`] bodies or as owned
//! vectors of legacy values.

use std::fmt;
use std::sync::Arc;

use quill_reflect::{Record, RecordRef};
use quill_value::{ListValue, MapValue, RuntimeError, StatusCode, UnknownSet};

use crate::convert::{from_legacy, to_legacy};
use crate::equality::legacy_equal;

/// Internal markers of the legacy model. They have no runtime value
/// counterpart and never cross the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialMarker {
    /// A value slot that was never initialized.
    Uninitialized,
    /// Overload-resolution placeholder standing for any kind.
    AnyKind,
}

/// An error in the legacy model: a status code and a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyStatus {
    pub code: StatusCode,
    pub message: String,
}

impl LegacyStatus {
    pub fn new(code: StatusCode, message: &str) -> Self {
        LegacyStatus {
            code,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for LegacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[derive(Debug, Clone)]
pub enum LegacyValue {
    Null,
    Bool(bool),
    Int64(i64),
    Uint64(u64),
    Double(f64),
    String(Arc<str>),
    Bytes(Arc<[u8]>),
    Duration(time::Duration),
    Timestamp(time::OffsetDateTime),
    Message(RecordRef),
    List(LegacyList),
    Map(LegacyMap),
    Type(Arc<str>),
    Error(Arc<LegacyStatus>),
    Unknown(Arc<UnknownSet>),
    Special(SpecialMarker),
}

impl LegacyValue {
    pub fn type_name(&self) -> &str {
        match self {
            LegacyValue::Null => "null_type",
            LegacyValue::Bool(_) => "bool",
            LegacyValue::Int64(_) => "int64",
            LegacyValue::Uint64(_) => "uint64",
            LegacyValue::Double(_) => "double",
            LegacyValue::String(_) => "string",
            LegacyValue::Bytes(_) => "bytes",
            LegacyValue::Duration(_) => "google.protobuf.Duration",
            LegacyValue::Timestamp(_) => "google.protobuf.Timestamp",
            LegacyValue::Message(record) => record.descriptor().full_name(),
            LegacyValue::List(_) => "list",
            LegacyValue::Map(_) => "map",
            LegacyValue::Type(_) => "type",
            LegacyValue::Error(_) => "*error*",
            LegacyValue::Unknown(_) => "*unknown*",
            LegacyValue::Special(_) => "*special*",
        }
    }

    pub fn string(s: &str) -> Self {
        LegacyValue::String(s.into())
    }

    pub fn bytes(b: &[u8]) -> Self {
        LegacyValue::Bytes(b.into())
    }

    pub fn error(code: StatusCode, message: &str) -> Self {
        LegacyValue::Error(Arc::new(LegacyStatus::new(code, message)))
    }

    /// An owned list of legacy values.
    pub fn list(items: Vec<LegacyValue>) -> Self {
        LegacyValue::List(LegacyList::Owned(Arc::new(items)))
    }

    /// An owned map of legacy key/value pairs.
    pub fn map(entries: Vec<(LegacyValue, LegacyValue)>) -> Self {
        LegacyValue::Map(LegacyMap::Owned(Arc::new(entries)))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LegacyValue::Error(_))
    }
}

// ──────────────────────────────────────────────
// Containers
// ──────────────────────────────────────────────

/// A legacy list: a view over a modern list body, or owned legacy items.
#[derive(Debug, Clone)]
pub enum LegacyList {
    Modern(ListValue),
    Owned(Arc<Vec<LegacyValue>>),
}

impl LegacyList {
    pub fn len(&self) -> usize {
        match self {
            LegacyList::Modern(list) => list.len(),
            LegacyList::Owned(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`. Elements of a modern view are converted on
    /// access.
    pub fn get(&self, index: usize) -> Result<Option<LegacyValue>, RuntimeError> {
        match self {
            LegacyList::Modern(list) => list.get(index).map(to_legacy).transpose(),
            LegacyList::Owned(items) => Ok(items.get(index).cloned()),
        }
    }
}

/// A legacy map: a view over a modern map body, or owned legacy pairs.
#[derive(Debug, Clone)]
pub enum LegacyMap {
    Modern(MapValue),
    Owned(Arc<Vec<(LegacyValue, LegacyValue)>>),
}

impl LegacyMap {
    pub fn len(&self) -> usize {
        match self {
            LegacyMap::Modern(map) => map.len(),
            LegacyMap::Owned(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up `key`. Numeric keys match across int and uint.
    pub fn get(&self, key: &LegacyValue) -> Result<Option<LegacyValue>, RuntimeError> {
        match self {
            LegacyMap::Modern(map) => map.find(&from_legacy(key)?)?.map(to_legacy).transpose(),
            LegacyMap::Owned(entries) => Ok(entries
                .iter()
                .find(|(k, _)| legacy_equal(k, key) == Some(true))
                .map(|(_, v)| v.clone())),
        }
    }

    /// All entries as legacy pairs.
    pub fn entries(&self) -> Result<Vec<(LegacyValue, LegacyValue)>, RuntimeError> {
        match self {
            LegacyMap::Modern(map) => map
                .iter()
                .map(|(k, v)| Ok((to_legacy(&k.to_value())?, to_legacy(v)?)))
                .collect(),
            LegacyMap::Owned(entries) => Ok(entries.as_ref().clone()),
        }
    }
}

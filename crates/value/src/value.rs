//! The runtime value enum.

use std::fmt;
use std::sync::Arc;

use time::format_description::well_known::Rfc3339;

use crate::error::{ErrorValue, RuntimeError};
use crate::kind::Kind;
use crate::list::ListValue;
use crate::map::MapValue;
use crate::strings::{BytesValue, StringValue};
use crate::structs::StructValue;
use crate::unknown::UnknownSet;

/// A runtime type, as produced by `type(x)`-style expressions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeValue {
    name: Arc<str>,
}

impl TypeValue {
    pub fn new(name: &str) -> Self {
        TypeValue { name: name.into() }
    }

    pub fn of_kind(kind: Kind) -> Self {
        TypeValue::new(kind.name())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TypeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The universal runtime datum.
///
/// Cloning is O(1) for every variant: string, bytes and container bodies
/// are shared through [`CowBox`](crate::CowBox) and structs through `Arc`.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Double(f64),
    String(StringValue),
    Bytes(BytesValue),
    Duration(time::Duration),
    Timestamp(time::OffsetDateTime),
    List(ListValue),
    Map(MapValue),
    Struct(StructValue),
    Type(TypeValue),
    Error(ErrorValue),
    Unknown(UnknownSet),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Uint(_) => Kind::Uint,
            Value::Double(_) => Kind::Double,
            Value::String(_) => Kind::String,
            Value::Bytes(_) => Kind::Bytes,
            Value::Duration(_) => Kind::Duration,
            Value::Timestamp(_) => Kind::Timestamp,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
            Value::Struct(_) => Kind::Struct,
            Value::Type(_) => Kind::Type,
            Value::Error(_) => Kind::Error,
            Value::Unknown(_) => Kind::Unknown,
        }
    }

    /// Runtime type name. Structs report their record type; everything
    /// else reports its kind name.
    pub fn type_name(&self) -> String {
        match self {
            Value::Struct(s) => s.type_name().to_string(),
            other => other.kind().name().to_string(),
        }
    }

    /// Wrap a runtime error as an error value.
    pub fn error(error: RuntimeError) -> Value {
        Value::Error(ErrorValue::new(error))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::Uint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListValue> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructValue> {
        match self {
            Value::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&RuntimeError> {
        match self {
            Value::Error(e) => Some(e.error()),
            _ => None,
        }
    }

    pub fn as_unknown(&self) -> Option<&UnknownSet> {
        match self {
            Value::Unknown(u) => Some(u),
            _ => None,
        }
    }
}

/// Heterogeneous equality: `Some(true)` only. Unknown operands and
/// errors are never equal to anything.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        crate::equality::heterogeneous_equal(self, other) == Some(true)
    }
}

// ──────────────────────────────────────────────
// Conversions into Value
// ──────────────────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::Uint(u)
    }
}

impl From<u32> for Value {
    fn from(u: u32) -> Self {
        Value::Uint(u64::from(u))
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(StringValue::new(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(StringValue::new(s))
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(BytesValue::new(b))
    }
}

impl From<StringValue> for Value {
    fn from(s: StringValue) -> Self {
        Value::String(s)
    }
}

impl From<BytesValue> for Value {
    fn from(b: BytesValue) -> Self {
        Value::Bytes(b)
    }
}

impl From<time::Duration> for Value {
    fn from(d: time::Duration) -> Self {
        Value::Duration(d)
    }
}

impl From<time::OffsetDateTime> for Value {
    fn from(t: time::OffsetDateTime) -> Self {
        Value::Timestamp(t)
    }
}

impl From<ListValue> for Value {
    fn from(l: ListValue) -> Self {
        Value::List(l)
    }
}

impl From<MapValue> for Value {
    fn from(m: MapValue) -> Self {
        Value::Map(m)
    }
}

impl From<StructValue> for Value {
    fn from(s: StructValue) -> Self {
        Value::Struct(s)
    }
}

impl From<UnknownSet> for Value {
    fn from(u: UnknownSet) -> Self {
        Value::Unknown(u)
    }
}

impl From<RuntimeError> for Value {
    fn from(e: RuntimeError) -> Self {
        Value::error(e)
    }
}

// ──────────────────────────────────────────────
// Display
// ──────────────────────────────────────────────

/// Render a duration as seconds with up to nine fractional digits and an
/// `s` suffix (`"1.5s"`, `"-0.000000001s"`).
pub(crate) fn format_duration(d: &time::Duration) -> String {
    let total = d.whole_nanoseconds();
    let sign = if total < 0 { "-" } else { "" };
    let abs = total.unsigned_abs();
    let secs = abs / 1_000_000_000;
    let nanos = abs % 1_000_000_000;
    if nanos == 0 {
        format!("{}{}s", sign, secs)
    } else {
        let frac = format!("{:09}", nanos);
        format!("{}{}.{}s", sign, secs, frac.trim_end_matches('0'))
    }
}

pub(crate) fn format_timestamp(t: &time::OffsetDateTime) -> Result<String, RuntimeError> {
    t.format(&Rfc3339)
        .map_err(|e| RuntimeError::InvalidArgument(format!("timestamp not representable: {}", e)))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}u", u),
            Value::Double(d) => write!(f, "{:?}", d),
            Value::String(s) => write!(f, "{:?}", s.as_str()),
            Value::Bytes(b) => write!(f, "{:?}", b),
            Value::Duration(d) => write!(f, "duration(\"{}\")", format_duration(d)),
            Value::Timestamp(t) => match format_timestamp(t) {
                Ok(text) => write!(f, "timestamp(\"{}\")", text),
                Err(_) => write!(f, "timestamp({})", t.unix_timestamp()),
            },
            Value::List(list) => {
                write!(f, "[")?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Struct(s) => {
                write!(f, "{}{{", s.type_name())?;
                let mut first = true;
                for name in s.field_names() {
                    if !matches!(s.has_field(&name), Ok(true)) {
                        continue;
                    }
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    match s.get_field(&name) {
                        Ok(value) => write!(f, "{}: {}", name, value)?,
                        Err(e) => write!(f, "{}: error({})", name, e)?,
                    }
                }
                write!(f, "}}")
            }
            Value::Type(t) => write!(f, "{}", t),
            Value::Error(e) => write!(f, "error({})", e),
            Value::Unknown(u) => {
                write!(f, "unknown{{")?;
                for (i, attr) in u.attributes().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", attr)?;
                }
                write!(f, "}}")
            }
        }
    }
}

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kind::Kind;
use crate::value::Value;

/// One runtime-typed step of an attribute path: a map key or list index.
///
/// `TypeKind` records the kind of a value that cannot act as a key; such a
/// qualifier still reports a [`kind`](AttributeQualifier::kind) but never
/// matches a concrete key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeQualifier {
    TypeKind(Kind),
    Int(i64),
    Uint(u64),
    String(String),
    Bool(bool),
}

impl AttributeQualifier {
    pub fn kind(&self) -> Kind {
        match self {
            AttributeQualifier::TypeKind(kind) => *kind,
            AttributeQualifier::Int(_) => Kind::Int,
            AttributeQualifier::Uint(_) => Kind::Uint,
            AttributeQualifier::String(_) => Kind::String,
            AttributeQualifier::Bool(_) => Kind::Bool,
        }
    }

    /// Build a qualifier from a runtime value. Values of kinds that cannot
    /// be keys become a `TypeKind` qualifier.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Int(i) => AttributeQualifier::Int(*i),
            Value::Uint(u) => AttributeQualifier::Uint(*u),
            Value::String(s) => AttributeQualifier::String(s.as_str().to_string()),
            Value::Bool(b) => AttributeQualifier::Bool(*b),
            other => AttributeQualifier::TypeKind(other.kind()),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttributeQualifier::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            AttributeQualifier::Uint(u) => Some(*u),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeQualifier::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeQualifier::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Compares only against the string alternative.
    pub fn is_match_str(&self, other: &str) -> bool {
        self.as_string() == Some(other)
    }

    /// The key as a runtime value. `TypeKind` has none.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            AttributeQualifier::TypeKind(_) => None,
            AttributeQualifier::Int(i) => Some(Value::Int(*i)),
            AttributeQualifier::Uint(u) => Some(Value::Uint(*u)),
            AttributeQualifier::String(s) => Some(Value::from(s.as_str())),
            AttributeQualifier::Bool(b) => Some(Value::Bool(*b)),
        }
    }
}

impl fmt::Display for AttributeQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeQualifier::TypeKind(kind) => write!(f, "<{}>", kind),
            AttributeQualifier::Int(i) => write!(f, "{}", i),
            AttributeQualifier::Uint(u) => write!(f, "{}u", u),
            AttributeQualifier::String(s) => write!(f, "{:?}", s),
            AttributeQualifier::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for AttributeQualifier {
    fn from(i: i64) -> Self {
        AttributeQualifier::Int(i)
    }
}

impl From<u64> for AttributeQualifier {
    fn from(u: u64) -> Self {
        AttributeQualifier::Uint(u)
    }
}

impl From<&str> for AttributeQualifier {
    fn from(s: &str) -> Self {
        AttributeQualifier::String(s.to_string())
    }
}

impl From<String> for AttributeQualifier {
    fn from(s: String) -> Self {
        AttributeQualifier::String(s)
    }
}

impl From<bool> for AttributeQualifier {
    fn from(b: bool) -> Self {
        AttributeQualifier::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_values_keep_their_kind() {
        let q = AttributeQualifier::from_value(&Value::Double(1.0));
        assert_eq!(q, AttributeQualifier::TypeKind(Kind::Double));
        assert_eq!(q.kind(), Kind::Double);
        assert_eq!(q.to_value(), None);
    }

    #[test]
    fn string_match_only_against_strings() {
        assert!(AttributeQualifier::from("a").is_match_str("a"));
        assert!(!AttributeQualifier::Int(1).is_match_str("1"));
    }

    #[test]
    fn serde_shape() {
        let q: AttributeQualifier = serde_json::from_value(serde_json::json!({ "int": 3 })).unwrap();
        assert_eq!(q, AttributeQualifier::Int(3));
        let json = serde_json::to_value(AttributeQualifier::TypeKind(Kind::Null)).unwrap();
        assert_eq!(json, serde_json::json!({ "type_kind": "null" }));
    }
}

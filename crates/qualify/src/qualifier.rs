use std::fmt;

use serde::{Deserialize, Serialize};

use quill_value::{AttributeQualifier, RuntimeError, Value};

/// A field selected at plan time, by number with its name kept for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldSpecifier {
    pub number: u32,
    pub name: String,
}

impl FieldSpecifier {
    pub fn new(number: u32, name: &str) -> Self {
        FieldSpecifier {
            number,
            name: name.to_string(),
        }
    }
}

/// One step of a select chain: a static field or a runtime key/index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectQualifier {
    Field(FieldSpecifier),
    Attribute(AttributeQualifier),
}

impl SelectQualifier {
    pub fn field(number: u32, name: &str) -> Self {
        SelectQualifier::Field(FieldSpecifier::new(number, name))
    }

    pub fn key(qualifier: impl Into<AttributeQualifier>) -> Self {
        SelectQualifier::Attribute(qualifier.into())
    }
}

impl From<FieldSpecifier> for SelectQualifier {
    fn from(spec: FieldSpecifier) -> Self {
        SelectQualifier::Field(spec)
    }
}

impl From<AttributeQualifier> for SelectQualifier {
    fn from(q: AttributeQualifier) -> Self {
        SelectQualifier::Attribute(q)
    }
}

impl fmt::Display for SelectQualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectQualifier::Field(spec) => write!(f, ".{}", spec.name),
            SelectQualifier::Attribute(q) => write!(f, "[{}]", q),
        }
    }
}

/// Outcome of qualifying a select chain.
///
/// `consumed` is the number of qualifiers applied. It is `None` when a
/// qualifier failed: the error is terminal and no prefix of the chain
/// should be treated as resolved. A `Some(k)` shorter than the chain
/// means a non-record value was reached after `k` qualifiers and the rest
/// is left to the caller.
#[derive(Debug, Clone)]
pub struct QualifyResult {
    pub value: Value,
    pub consumed: Option<usize>,
}

impl QualifyResult {
    pub fn resolved(value: Value, consumed: usize) -> Self {
        QualifyResult {
            value,
            consumed: Some(consumed),
        }
    }

    pub fn failed(error: RuntimeError) -> Self {
        QualifyResult {
            value: Value::error(error),
            consumed: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.value.is_error()
    }

    pub fn error(&self) -> Option<&RuntimeError> {
        self.value.as_error()
    }
}

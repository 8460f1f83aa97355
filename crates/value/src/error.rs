//! Runtime error taxonomy.
//!
//! Runtime failures are values: a [`RuntimeError`] travels inside
//! `Value::Error` so that one failed sub-expression can sit inside a
//! larger result (a single map entry, a list element) without aborting
//! the rest.

use std::fmt;
use std::sync::Arc;

/// Canonical status code of a runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    NotFound,
    InvalidArgument,
    OutOfRange,
    Unimplemented,
    Internal,
    Unknown,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::OutOfRange => "OUT_OF_RANGE",
            StatusCode::Unimplemented => "UNIMPLEMENTED",
            StatusCode::Internal => "INTERNAL",
            StatusCode::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    /// The record type declares no field with this name or number.
    #[error("no such field '{field}' in {message}")]
    NoSuchField { message: String, field: String },

    #[error("key not found in map: {key}")]
    NoSuchKey { key: String },

    /// A map key of the wrong kind for the map's declared key type.
    #[error("invalid map key type: expected {expected}, got {got}")]
    InvalidMapKeyType { expected: String, got: String },

    #[error("index out of range: {index} (size {size})")]
    IndexOutOfRange { index: i64, size: usize },

    /// An integer key that does not fit the map's narrower key type.
    #[error("map key {key} out of range for {key_type}")]
    KeyOutOfRange { key: String, key_type: String },

    /// A feature or field-kind combination that is intentionally
    /// unsupported.
    #[error("unimplemented: {0}")]
    Unimplemented(String),

    #[error("unsupported conversion from {type_name} to {target}")]
    UnsupportedConversion { type_name: String, target: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An attribute declared missing by the caller was accessed.
    #[error("missing attribute: {attribute}")]
    MissingAttribute { attribute: String },

    /// An invariant violation; never caused by user input.
    #[error("internal error: {0}")]
    Internal(String),

    /// An error imported from the legacy representation.
    #[error("{code}: {message}")]
    Status { code: StatusCode, message: String },
}

impl RuntimeError {
    pub fn code(&self) -> StatusCode {
        match self {
            RuntimeError::NoSuchField { .. } | RuntimeError::NoSuchKey { .. } => StatusCode::NotFound,
            RuntimeError::InvalidMapKeyType { .. }
            | RuntimeError::UnsupportedConversion { .. }
            | RuntimeError::InvalidArgument(_)
            | RuntimeError::MissingAttribute { .. } => StatusCode::InvalidArgument,
            RuntimeError::IndexOutOfRange { .. } | RuntimeError::KeyOutOfRange { .. } => {
                StatusCode::OutOfRange
            }
            RuntimeError::Unimplemented(_) => StatusCode::Unimplemented,
            RuntimeError::Internal(_) => StatusCode::Internal,
            RuntimeError::Status { code, .. } => *code,
        }
    }

    pub fn no_such_field(message: &str, field: &str) -> Self {
        RuntimeError::NoSuchField {
            message: message.to_string(),
            field: field.to_string(),
        }
    }

    pub fn unsupported_conversion(type_name: &str, target: &str) -> Self {
        RuntimeError::UnsupportedConversion {
            type_name: type_name.to_string(),
            target: target.to_string(),
        }
    }
}

/// Shared handle to a runtime error, carried by `Value::Error`.
///
/// Error values never compare equal to anything, including another error
/// with the same content.
#[derive(Debug, Clone)]
pub struct ErrorValue {
    error: Arc<RuntimeError>,
}

impl ErrorValue {
    pub fn new(error: RuntimeError) -> Self {
        ErrorValue {
            error: Arc::new(error),
        }
    }

    pub fn error(&self) -> &RuntimeError {
        &self.error
    }

    pub fn code(&self) -> StatusCode {
        self.error.code()
    }
}

impl From<RuntimeError> for ErrorValue {
    fn from(error: RuntimeError) -> Self {
        ErrorValue::new(error)
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

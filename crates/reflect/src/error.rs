/// Errors raised while building schemas or populating records.
///
/// These are configuration errors returned through `Result`; runtime
/// failures during qualification are carried as error values instead.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// A message type with this full name is already registered.
    #[error("duplicate message type: {name}")]
    DuplicateMessage { name: String },

    /// Two fields of one message share a number or a name.
    #[error("duplicate field '{field}' in message {message}")]
    DuplicateField { message: String, field: String },

    /// A referenced message type is not registered in the pool.
    #[error("unknown message type: {name}")]
    UnknownMessage { name: String },

    /// A field declares a type the schema language does not know.
    #[error("unknown field type: {type_name}")]
    UnknownFieldType { type_name: String },

    /// A record operation named a field its message does not declare.
    #[error("no field '{field}' in message {message}")]
    NoSuchField { message: String, field: String },

    /// A value does not fit the field it was assigned to.
    #[error("field '{field}' expects {expected}, got {got}")]
    ValueMismatch {
        field: String,
        expected: String,
        got: String,
    },

    /// The schema document itself is malformed.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("schema JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

//! Well-known message types.
//!
//! These types have a dedicated runtime representation (scalars, time
//! values or JSON-like containers) and are converted atomically instead of
//! being traversed field by field.

use crate::descriptor::{FieldDescriptor, FieldKind, MapKeyType, MessageDescriptor};
use crate::error::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellKnownType {
    Any,
    Struct,
    Value,
    ListValue,
    Timestamp,
    Duration,
    BoolValue,
    Int32Value,
    Int64Value,
    UInt32Value,
    UInt64Value,
    FloatValue,
    DoubleValue,
    StringValue,
    BytesValue,
}

pub const ALL_WELL_KNOWN: [WellKnownType; 15] = [
    WellKnownType::Any,
    WellKnownType::Struct,
    WellKnownType::Value,
    WellKnownType::ListValue,
    WellKnownType::Timestamp,
    WellKnownType::Duration,
    WellKnownType::BoolValue,
    WellKnownType::Int32Value,
    WellKnownType::Int64Value,
    WellKnownType::UInt32Value,
    WellKnownType::UInt64Value,
    WellKnownType::FloatValue,
    WellKnownType::DoubleValue,
    WellKnownType::StringValue,
    WellKnownType::BytesValue,
];

impl WellKnownType {
    pub fn from_full_name(name: &str) -> Option<WellKnownType> {
        ALL_WELL_KNOWN.iter().copied().find(|wkt| wkt.full_name() == name)
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            WellKnownType::Any => "google.protobuf.Any",
            WellKnownType::Struct => "google.protobuf.Struct",
            WellKnownType::Value => "google.protobuf.Value",
            WellKnownType::ListValue => "google.protobuf.ListValue",
            WellKnownType::Timestamp => "google.protobuf.Timestamp",
            WellKnownType::Duration => "google.protobuf.Duration",
            WellKnownType::BoolValue => "google.protobuf.BoolValue",
            WellKnownType::Int32Value => "google.protobuf.Int32Value",
            WellKnownType::Int64Value => "google.protobuf.Int64Value",
            WellKnownType::UInt32Value => "google.protobuf.UInt32Value",
            WellKnownType::UInt64Value => "google.protobuf.UInt64Value",
            WellKnownType::FloatValue => "google.protobuf.FloatValue",
            WellKnownType::DoubleValue => "google.protobuf.DoubleValue",
            WellKnownType::StringValue => "google.protobuf.StringValue",
            WellKnownType::BytesValue => "google.protobuf.BytesValue",
        }
    }

    /// Scalar wrapper types (`google.protobuf.Int64Value` and friends).
    pub fn is_wrapper(&self) -> bool {
        self.wrapped_kind().is_some()
    }

    /// JSON-like containers and `Any` must be read whole; a select chain
    /// can never step inside them.
    pub fn is_json_like(&self) -> bool {
        matches!(
            self,
            WellKnownType::Any
                | WellKnownType::Struct
                | WellKnownType::Value
                | WellKnownType::ListValue
        )
    }

    /// Whether a select chain may step into fields of this type. Never
    /// true: wrappers and time types convert to a single value, and the
    /// JSON-like types must be read whole.
    pub fn is_traversable(&self) -> bool {
        false
    }

    /// Kind of the `value` field of a wrapper type.
    pub fn wrapped_kind(&self) -> Option<FieldKind> {
        match self {
            WellKnownType::BoolValue => Some(FieldKind::Bool),
            WellKnownType::Int32Value => Some(FieldKind::Int32),
            WellKnownType::Int64Value => Some(FieldKind::Int64),
            WellKnownType::UInt32Value => Some(FieldKind::Uint32),
            WellKnownType::UInt64Value => Some(FieldKind::Uint64),
            WellKnownType::FloatValue => Some(FieldKind::Float),
            WellKnownType::DoubleValue => Some(FieldKind::Double),
            WellKnownType::StringValue => Some(FieldKind::String),
            WellKnownType::BytesValue => Some(FieldKind::Bytes),
            _ => None,
        }
    }

    pub fn descriptor(&self) -> Result<MessageDescriptor, SchemaError> {
        let message = |name: &str| FieldKind::Message {
            type_name: name.to_string(),
        };
        let fields = match self {
            WellKnownType::Any => vec![
                FieldDescriptor::singular(1, "type_url", FieldKind::String),
                FieldDescriptor::singular(2, "value", FieldKind::Bytes),
            ],
            WellKnownType::Struct => vec![FieldDescriptor::map(
                1,
                "fields",
                MapKeyType::String,
                message("google.protobuf.Value"),
            )],
            // The six members of the `kind` oneof each track presence.
            WellKnownType::Value => vec![
                FieldDescriptor::singular(
                    1,
                    "null_value",
                    FieldKind::Enum {
                        type_name: "google.protobuf.NullValue".to_string(),
                    },
                )
                .optional(),
                FieldDescriptor::singular(2, "number_value", FieldKind::Double).optional(),
                FieldDescriptor::singular(3, "string_value", FieldKind::String).optional(),
                FieldDescriptor::singular(4, "bool_value", FieldKind::Bool).optional(),
                FieldDescriptor::singular(5, "struct_value", message("google.protobuf.Struct")),
                FieldDescriptor::singular(6, "list_value", message("google.protobuf.ListValue")),
            ],
            WellKnownType::ListValue => vec![FieldDescriptor::repeated(
                1,
                "values",
                message("google.protobuf.Value"),
            )],
            WellKnownType::Timestamp | WellKnownType::Duration => vec![
                FieldDescriptor::singular(1, "seconds", FieldKind::Int64),
                FieldDescriptor::singular(2, "nanos", FieldKind::Int32),
            ],
            wrapper => {
                let kind = wrapper.wrapped_kind().ok_or_else(|| {
                    SchemaError::InvalidSchema(format!("no descriptor for {}", wrapper.full_name()))
                })?;
                vec![FieldDescriptor::singular(1, "value", kind)]
            }
        };
        MessageDescriptor::new(self.full_name(), fields)
    }
}

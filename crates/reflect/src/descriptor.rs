//! Schema descriptors for reflective records.
//!
//! A [`MessageDescriptor`] names a record type and lists its fields; each
//! [`FieldDescriptor`] carries the field number, name, element kind and
//! whether the field is singular, repeated or a map. Descriptors are
//! immutable once registered in a [`DescriptorPool`](crate::DescriptorPool).

use std::collections::BTreeMap;
use std::fmt;

use crate::error::SchemaError;
use crate::well_known::WellKnownType;

// ──────────────────────────────────────────────
// Field kinds
// ──────────────────────────────────────────────

/// Element type of a field. For map fields this is the value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Float,
    Double,
    String,
    Bytes,
    Enum { type_name: String },
    Message { type_name: String },
}

impl FieldKind {
    /// Parse a schema type name (`"int64"`, `"message"`, ...).
    ///
    /// `enum` and `message` kinds require the referenced type name.
    pub fn parse(name: &str, type_name: Option<&str>) -> Result<FieldKind, SchemaError> {
        let referenced = |kind: &str| {
            type_name
                .map(|t| t.to_string())
                .ok_or_else(|| SchemaError::InvalidSchema(format!("{} field missing 'type_name'", kind)))
        };
        match name {
            "bool" => Ok(FieldKind::Bool),
            "int32" | "sint32" | "sfixed32" => Ok(FieldKind::Int32),
            "int64" | "sint64" | "sfixed64" => Ok(FieldKind::Int64),
            "uint32" | "fixed32" => Ok(FieldKind::Uint32),
            "uint64" | "fixed64" => Ok(FieldKind::Uint64),
            "float" => Ok(FieldKind::Float),
            "double" => Ok(FieldKind::Double),
            "string" => Ok(FieldKind::String),
            "bytes" => Ok(FieldKind::Bytes),
            "enum" => Ok(FieldKind::Enum {
                type_name: referenced("enum")?,
            }),
            "message" => Ok(FieldKind::Message {
                type_name: referenced("message")?,
            }),
            other => Err(SchemaError::UnknownFieldType {
                type_name: other.to_string(),
            }),
        }
    }

    /// The referenced message type, if this is a message kind.
    pub fn message_type(&self) -> Option<&str> {
        match self {
            FieldKind::Message { type_name } => Some(type_name),
            _ => None,
        }
    }

    pub fn is_message(&self) -> bool {
        matches!(self, FieldKind::Message { .. })
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::Int32 => write!(f, "int32"),
            FieldKind::Int64 => write!(f, "int64"),
            FieldKind::Uint32 => write!(f, "uint32"),
            FieldKind::Uint64 => write!(f, "uint64"),
            FieldKind::Float => write!(f, "float"),
            FieldKind::Double => write!(f, "double"),
            FieldKind::String => write!(f, "string"),
            FieldKind::Bytes => write!(f, "bytes"),
            FieldKind::Enum { type_name } => write!(f, "enum {}", type_name),
            FieldKind::Message { type_name } => write!(f, "{}", type_name),
        }
    }
}

/// Declared key type of a map field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKeyType {
    Bool,
    Int32,
    Int64,
    Uint32,
    Uint64,
    String,
}

impl MapKeyType {
    pub fn parse(name: &str) -> Option<MapKeyType> {
        match name {
            "bool" => Some(MapKeyType::Bool),
            "int32" | "sint32" | "sfixed32" => Some(MapKeyType::Int32),
            "int64" | "sint64" | "sfixed64" => Some(MapKeyType::Int64),
            "uint32" | "fixed32" => Some(MapKeyType::Uint32),
            "uint64" | "fixed64" => Some(MapKeyType::Uint64),
            "string" => Some(MapKeyType::String),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MapKeyType::Bool => "bool",
            MapKeyType::Int32 => "int32",
            MapKeyType::Int64 => "int64",
            MapKeyType::Uint32 => "uint32",
            MapKeyType::Uint64 => "uint64",
            MapKeyType::String => "string",
        }
    }
}

impl fmt::Display for MapKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a field holds one value, a list, or a keyed map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Singular,
    Repeated,
    Map(MapKeyType),
}

// ──────────────────────────────────────────────
// Field descriptor
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub number: u32,
    pub name: String,
    pub kind: FieldKind,
    pub cardinality: Cardinality,
    /// Field tracks set/unset independently of its value (`optional`
    /// scalars). Singular message fields always track presence.
    pub explicit_presence: bool,
}

impl FieldDescriptor {
    pub fn singular(number: u32, name: &str, kind: FieldKind) -> Self {
        FieldDescriptor {
            number,
            name: name.to_string(),
            kind,
            cardinality: Cardinality::Singular,
            explicit_presence: false,
        }
    }

    pub fn repeated(number: u32, name: &str, kind: FieldKind) -> Self {
        FieldDescriptor {
            cardinality: Cardinality::Repeated,
            ..FieldDescriptor::singular(number, name, kind)
        }
    }

    pub fn map(number: u32, name: &str, key: MapKeyType, value: FieldKind) -> Self {
        FieldDescriptor {
            cardinality: Cardinality::Map(key),
            ..FieldDescriptor::singular(number, name, value)
        }
    }

    /// Mark the field as tracking explicit presence.
    pub fn optional(mut self) -> Self {
        self.explicit_presence = true;
        self
    }

    pub fn is_map(&self) -> bool {
        matches!(self.cardinality, Cardinality::Map(_))
    }

    pub fn is_repeated(&self) -> bool {
        self.cardinality == Cardinality::Repeated
    }

    pub fn is_container(&self) -> bool {
        self.cardinality != Cardinality::Singular
    }

    pub fn map_key_type(&self) -> Option<MapKeyType> {
        match self.cardinality {
            Cardinality::Map(key) => Some(key),
            _ => None,
        }
    }

    /// Whether an unset singular field can be told apart from one holding
    /// its default value.
    pub fn has_presence(&self) -> bool {
        self.cardinality == Cardinality::Singular && (self.explicit_presence || self.kind.is_message())
    }
}

// ──────────────────────────────────────────────
// Message descriptor
// ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MessageDescriptor {
    full_name: String,
    fields: Vec<FieldDescriptor>,
    by_number: BTreeMap<u32, usize>,
    by_name: BTreeMap<String, usize>,
}

impl MessageDescriptor {
    /// Build a descriptor, rejecting duplicate field numbers or names.
    pub fn new(full_name: &str, fields: Vec<FieldDescriptor>) -> Result<Self, SchemaError> {
        let mut by_number = BTreeMap::new();
        let mut by_name = BTreeMap::new();
        for (idx, field) in fields.iter().enumerate() {
            if field.number == 0 {
                return Err(SchemaError::InvalidSchema(format!(
                    "field '{}' of '{}' has number 0",
                    field.name, full_name
                )));
            }
            if by_number.insert(field.number, idx).is_some()
                || by_name.insert(field.name.clone(), idx).is_some()
            {
                return Err(SchemaError::DuplicateField {
                    message: full_name.to_string(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(MessageDescriptor {
            full_name: full_name.to_string(),
            fields,
            by_number,
            by_name,
        })
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn find_field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.by_number.get(&number).map(|idx| &self.fields[*idx])
    }

    pub fn find_field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.by_name.get(name).map(|idx| &self.fields[*idx])
    }

    pub fn well_known(&self) -> Option<WellKnownType> {
        WellKnownType::from_full_name(&self.full_name)
    }
}

impl PartialEq for MessageDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.full_name == other.full_name && self.fields == other.fields
    }
}

impl Eq for MessageDescriptor {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_kinds() {
        assert_eq!(FieldKind::parse("sint64", None).unwrap(), FieldKind::Int64);
        assert_eq!(
            FieldKind::parse("message", Some("a.B")).unwrap(),
            FieldKind::Message {
                type_name: "a.B".to_string()
            }
        );
        assert!(FieldKind::parse("message", None).is_err());
        assert!(matches!(
            FieldKind::parse("decimal", None),
            Err(SchemaError::UnknownFieldType { .. })
        ));
    }

    #[test]
    fn lookup_by_number_and_name() {
        let desc = MessageDescriptor::new(
            "test.Msg",
            vec![
                FieldDescriptor::singular(1, "a", FieldKind::Int64),
                FieldDescriptor::repeated(7, "b", FieldKind::String),
            ],
        )
        .unwrap();
        assert_eq!(desc.find_field_by_number(7).unwrap().name, "b");
        assert_eq!(desc.find_field_by_name("a").unwrap().number, 1);
        assert!(desc.find_field_by_number(2).is_none());
        assert!(desc.well_known().is_none());
    }

    #[test]
    fn duplicate_field_rejected() {
        let result = MessageDescriptor::new(
            "test.Msg",
            vec![
                FieldDescriptor::singular(1, "a", FieldKind::Int64),
                FieldDescriptor::singular(1, "b", FieldKind::Int64),
            ],
        );
        assert!(matches!(result, Err(SchemaError::DuplicateField { .. })));
    }

    #[test]
    fn presence_rules() {
        let scalar = FieldDescriptor::singular(1, "a", FieldKind::Int64);
        let optional = FieldDescriptor::singular(2, "b", FieldKind::Int64).optional();
        let message = FieldDescriptor::singular(
            3,
            "c",
            FieldKind::Message {
                type_name: "x.Y".to_string(),
            },
        );
        let list = FieldDescriptor::repeated(
            4,
            "d",
            FieldKind::Message {
                type_name: "x.Y".to_string(),
            },
        );
        assert!(!scalar.has_presence());
        assert!(optional.has_presence());
        assert!(message.has_presence());
        assert!(!list.has_presence());
        assert!(list.is_container());
    }
}

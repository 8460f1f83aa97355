//! Registry of message descriptors.
//!
//! A pool always contains the well-known types. Application schemas are
//! registered programmatically or loaded from a JSON schema document:
//!
//! ```json
//! {
//!   "messages": [
//!     {
//!       "name": "shop.Order",
//!       "fields": [
//!         { "number": 1, "name": "id", "type": "string" },
//!         { "number": 2, "name": "qty", "type": "int64", "label": "repeated" },
//!         { "number": 3, "name": "tags", "type": "int64", "label": "map", "key": "string" },
//!         { "number": 4, "name": "buyer", "type": "message", "type_name": "shop.Buyer" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;

use crate::descriptor::{Cardinality, FieldDescriptor, FieldKind, MapKeyType, MessageDescriptor};
use crate::error::SchemaError;
use crate::well_known::ALL_WELL_KNOWN;

#[derive(Debug, Clone)]
pub struct DescriptorPool {
    messages: BTreeMap<String, Arc<MessageDescriptor>>,
}

impl Default for DescriptorPool {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorPool {
    /// Create a pool holding only the well-known types.
    pub fn new() -> Self {
        let mut messages = BTreeMap::new();
        for wkt in ALL_WELL_KNOWN {
            if let Ok(desc) = wkt.descriptor() {
                messages.insert(wkt.full_name().to_string(), Arc::new(desc));
            }
        }
        DescriptorPool { messages }
    }

    /// Register a message descriptor.
    pub fn register(
        &mut self,
        descriptor: MessageDescriptor,
    ) -> Result<Arc<MessageDescriptor>, SchemaError> {
        let name = descriptor.full_name().to_string();
        if self.messages.contains_key(&name) {
            return Err(SchemaError::DuplicateMessage { name });
        }
        tracing::debug!(message = %name, fields = descriptor.fields().len(), "registered message type");
        let descriptor = Arc::new(descriptor);
        self.messages.insert(name, descriptor.clone());
        Ok(descriptor)
    }

    pub fn get(&self, full_name: &str) -> Option<&Arc<MessageDescriptor>> {
        self.messages.get(full_name)
    }

    /// Look up a message type, failing when it is not registered.
    pub fn require(&self, full_name: &str) -> Result<&Arc<MessageDescriptor>, SchemaError> {
        self.get(full_name).ok_or_else(|| SchemaError::UnknownMessage {
            name: full_name.to_string(),
        })
    }

    pub fn message_names(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(|k| k.as_str())
    }

    /// Check that every message-typed field refers to a registered type.
    pub fn validate(&self) -> Result<(), SchemaError> {
        for desc in self.messages.values() {
            for field in desc.fields() {
                if let Some(type_name) = field.kind.message_type() {
                    self.require(type_name)?;
                }
            }
        }
        Ok(())
    }

    /// Load a pool from a JSON schema document.
    pub fn from_json(doc: &serde_json::Value) -> Result<Self, SchemaError> {
        let schema = SchemaDoc::deserialize(doc)?;
        let mut pool = DescriptorPool::new();
        for message in schema.messages {
            let fields = message
                .fields
                .into_iter()
                .map(FieldDef::into_descriptor)
                .collect::<Result<Vec<_>, _>>()?;
            pool.register(MessageDescriptor::new(&message.name, fields)?)?;
        }
        pool.validate()?;
        Ok(pool)
    }

    /// Parse a JSON schema document from text.
    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let doc: serde_json::Value = serde_json::from_str(text)?;
        Self::from_json(&doc)
    }
}

// ──────────────────────────────────────────────
// Schema document
// ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SchemaDoc {
    #[serde(default)]
    messages: Vec<MessageDef>,
}

#[derive(Debug, Deserialize)]
struct MessageDef {
    name: String,
    #[serde(default)]
    fields: Vec<FieldDef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Label {
    #[default]
    Singular,
    Repeated,
    Map,
}

#[derive(Debug, Deserialize)]
struct FieldDef {
    number: u32,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    type_name: Option<String>,
    #[serde(default)]
    label: Label,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    optional: bool,
}

impl FieldDef {
    fn into_descriptor(self) -> Result<FieldDescriptor, SchemaError> {
        let kind = FieldKind::parse(&self.kind, self.type_name.as_deref())?;
        let cardinality = match self.label {
            Label::Singular => Cardinality::Singular,
            Label::Repeated => Cardinality::Repeated,
            Label::Map => {
                let key_name = self.key.as_deref().ok_or_else(|| {
                    SchemaError::InvalidSchema(format!("map field '{}' missing 'key'", self.name))
                })?;
                let key = MapKeyType::parse(key_name).ok_or_else(|| {
                    SchemaError::InvalidSchema(format!(
                        "map field '{}' has invalid key type '{}'",
                        self.name, key_name
                    ))
                })?;
                Cardinality::Map(key)
            }
        };
        if self.optional && cardinality != Cardinality::Singular {
            return Err(SchemaError::InvalidSchema(format!(
                "field '{}': only singular fields can be optional",
                self.name
            )));
        }
        Ok(FieldDescriptor {
            number: self.number,
            name: self.name,
            kind,
            cardinality,
            explicit_presence: self.optional,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::well_known::WellKnownType;
    use serde_json::json;

    #[test]
    fn new_pool_has_well_known_types() {
        let pool = DescriptorPool::new();
        assert!(pool.get("google.protobuf.Timestamp").is_some());
        assert!(pool.get("google.protobuf.Struct").is_some());
        assert_eq!(pool.message_names().count(), ALL_WELL_KNOWN.len());
        pool.validate().unwrap();
    }

    #[test]
    fn load_schema_from_json() {
        let pool = DescriptorPool::from_json(&json!({
            "messages": [
                {
                    "name": "test.Outer",
                    "fields": [
                        { "number": 1, "name": "id", "type": "string" },
                        { "number": 2, "name": "inner", "type": "message", "type_name": "test.Inner" },
                        { "number": 3, "name": "m", "type": "int64", "label": "map", "key": "uint32" },
                        { "number": 4, "name": "ts", "type": "message", "type_name": "google.protobuf.Timestamp" }
                    ]
                },
                {
                    "name": "test.Inner",
                    "fields": [
                        { "number": 1, "name": "n", "type": "int32", "optional": true }
                    ]
                }
            ]
        }))
        .unwrap();
        let outer = pool.require("test.Outer").unwrap();
        let m = outer.find_field_by_name("m").unwrap();
        assert_eq!(m.map_key_type(), Some(MapKeyType::Uint32));
        assert_eq!(m.kind, FieldKind::Int64);
        let ts = outer.find_field_by_number(4).unwrap();
        let ts_desc = pool.require(ts.kind.message_type().unwrap()).unwrap();
        assert_eq!(ts_desc.well_known(), Some(WellKnownType::Timestamp));
        let inner = pool.require("test.Inner").unwrap();
        assert!(inner.find_field_by_name("n").unwrap().has_presence());
    }

    #[test]
    fn dangling_message_reference_rejected() {
        let result = DescriptorPool::from_json(&json!({
            "messages": [
                {
                    "name": "test.Outer",
                    "fields": [
                        { "number": 1, "name": "x", "type": "message", "type_name": "test.Missing" }
                    ]
                }
            ]
        }));
        assert!(matches!(result, Err(SchemaError::UnknownMessage { name }) if name == "test.Missing"));
    }

    #[test]
    fn duplicate_message_rejected() {
        let result = DescriptorPool::from_json(&json!({
            "messages": [
                { "name": "test.A", "fields": [] },
                { "name": "test.A", "fields": [] }
            ]
        }));
        assert!(matches!(result, Err(SchemaError::DuplicateMessage { .. })));
    }

    #[test]
    fn map_without_key_rejected() {
        let result = DescriptorPool::from_json_str(
            r#"{ "messages": [ { "name": "t.A", "fields": [
                { "number": 1, "name": "m", "type": "string", "label": "map" } ] } ] }"#,
        );
        assert!(matches!(result, Err(SchemaError::InvalidSchema(_))));
    }
}

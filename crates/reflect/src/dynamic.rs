//! A map-backed [`Record`] built at runtime from a descriptor.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::{Cardinality, FieldDescriptor, FieldKind, MessageDescriptor};
use crate::error::SchemaError;
use crate::pool::DescriptorPool;
use crate::record::{FieldValue, MapKey, Record, RecordRef, ScalarValue};

#[derive(Clone)]
pub struct DynamicRecord {
    pool: Arc<DescriptorPool>,
    descriptor: Arc<MessageDescriptor>,
    fields: BTreeMap<u32, FieldValue>,
}

impl DynamicRecord {
    /// Create an empty record of the named type.
    pub fn new(pool: &Arc<DescriptorPool>, type_name: &str) -> Result<Self, SchemaError> {
        let descriptor = pool.require(type_name)?.clone();
        Ok(DynamicRecord {
            pool: pool.clone(),
            descriptor,
            fields: BTreeMap::new(),
        })
    }

    pub fn pool(&self) -> &Arc<DescriptorPool> {
        &self.pool
    }

    pub fn into_ref(self) -> RecordRef {
        Arc::new(self)
    }

    fn lookup(&self, name: &str) -> Result<FieldDescriptor, SchemaError> {
        self.descriptor
            .find_field_by_name(name)
            .cloned()
            .ok_or_else(|| SchemaError::NoSuchField {
                message: self.descriptor.full_name().to_string(),
                field: name.to_string(),
            })
    }

    /// Set a singular field.
    pub fn set(&mut self, name: &str, value: ScalarValue) -> Result<&mut Self, SchemaError> {
        let field = self.lookup(name)?;
        if field.cardinality != Cardinality::Singular {
            return Err(mismatch(&field, "a singular value", "container field"));
        }
        check_scalar(&field, &value)?;
        self.fields.insert(field.number, FieldValue::Singular(value));
        Ok(self)
    }

    /// Append an element to a repeated field.
    pub fn push(&mut self, name: &str, value: ScalarValue) -> Result<&mut Self, SchemaError> {
        let field = self.lookup(name)?;
        if !field.is_repeated() {
            return Err(mismatch(&field, "a repeated field", "non-repeated field"));
        }
        check_scalar(&field, &value)?;
        match self
            .fields
            .entry(field.number)
            .or_insert_with(|| FieldValue::Repeated(Vec::new()))
        {
            FieldValue::Repeated(items) => items.push(value),
            _ => return Err(mismatch(&field, "a repeated field", "stored non-list value")),
        }
        Ok(self)
    }

    /// Insert an entry into a map field.
    pub fn insert(
        &mut self,
        name: &str,
        key: MapKey,
        value: ScalarValue,
    ) -> Result<&mut Self, SchemaError> {
        let field = self.lookup(name)?;
        let key_type = field
            .map_key_type()
            .ok_or_else(|| mismatch(&field, "a map field", "non-map field"))?;
        if key.key_type() != key_type {
            return Err(mismatch(&field, key_type.name(), key.key_type().name()));
        }
        check_scalar(&field, &value)?;
        match self
            .fields
            .entry(field.number)
            .or_insert_with(|| FieldValue::Map(BTreeMap::new()))
        {
            FieldValue::Map(entries) => {
                entries.insert(key, value);
            }
            _ => return Err(mismatch(&field, "a map field", "stored non-map value")),
        }
        Ok(self)
    }

    /// Reset a field to unset.
    pub fn clear(&mut self, name: &str) -> Result<&mut Self, SchemaError> {
        let field = self.lookup(name)?;
        self.fields.remove(&field.number);
        Ok(self)
    }

    /// Build a record from a JSON object keyed by field name.
    ///
    /// Nested messages are JSON objects; repeated fields are arrays; map
    /// fields are objects whose keys are parsed per the declared key type.
    pub fn from_json(
        pool: &Arc<DescriptorPool>,
        type_name: &str,
        json: &serde_json::Value,
    ) -> Result<Self, SchemaError> {
        let mut record = DynamicRecord::new(pool, type_name)?;
        let obj = json.as_object().ok_or_else(|| {
            SchemaError::InvalidSchema(format!("record of type {} must be a JSON object", type_name))
        })?;
        for (name, value) in obj {
            let field = record.lookup(name)?;
            let content = match field.cardinality {
                Cardinality::Singular => {
                    FieldValue::Singular(scalar_from_json(pool, &field, value)?)
                }
                Cardinality::Repeated => {
                    let items = value
                        .as_array()
                        .ok_or_else(|| mismatch(&field, "array", json_type(value)))?;
                    FieldValue::Repeated(
                        items
                            .iter()
                            .map(|item| scalar_from_json(pool, &field, item))
                            .collect::<Result<_, _>>()?,
                    )
                }
                Cardinality::Map(key_type) => {
                    let entries = value
                        .as_object()
                        .ok_or_else(|| mismatch(&field, "object", json_type(value)))?;
                    let mut map = BTreeMap::new();
                    for (k, v) in entries {
                        let key = MapKey::parse(key_type, k)
                            .ok_or_else(|| mismatch(&field, key_type.name(), k))?;
                        map.insert(key, scalar_from_json(pool, &field, v)?);
                    }
                    FieldValue::Map(map)
                }
            };
            record.fields.insert(field.number, content);
        }
        Ok(record)
    }
}

impl fmt::Debug for DynamicRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.descriptor.full_name())
            .field("fields", &self.fields)
            .finish()
    }
}

impl Record for DynamicRecord {
    fn descriptor(&self) -> &Arc<MessageDescriptor> {
        &self.descriptor
    }

    fn field(&self, number: u32) -> Option<&FieldValue> {
        self.fields.get(&number)
    }

    fn empty_message(&self, field: &FieldDescriptor) -> Option<RecordRef> {
        let type_name = field.kind.message_type()?;
        DynamicRecord::new(&self.pool, type_name)
            .ok()
            .map(DynamicRecord::into_ref)
    }
}

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn mismatch(field: &FieldDescriptor, expected: &str, got: &str) -> SchemaError {
    SchemaError::ValueMismatch {
        field: field.name.clone(),
        expected: expected.to_string(),
        got: got.to_string(),
    }
}

fn check_scalar(field: &FieldDescriptor, value: &ScalarValue) -> Result<(), SchemaError> {
    if value.fits(&field.kind) {
        Ok(())
    } else {
        Err(mismatch(field, &field.kind.to_string(), value.type_name()))
    }
}

fn json_type(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn scalar_from_json(
    pool: &Arc<DescriptorPool>,
    field: &FieldDescriptor,
    v: &serde_json::Value,
) -> Result<ScalarValue, SchemaError> {
    let expected = field.kind.to_string();
    let bad = || mismatch(field, &expected, json_type(v));
    let scalar = match &field.kind {
        FieldKind::Bool => ScalarValue::Bool(v.as_bool().ok_or_else(bad)?),
        FieldKind::Int32 => {
            let i = v.as_i64().ok_or_else(bad)?;
            ScalarValue::Int32(i32::try_from(i).map_err(|_| bad())?)
        }
        FieldKind::Int64 => ScalarValue::Int64(v.as_i64().ok_or_else(bad)?),
        FieldKind::Uint32 => {
            let u = v.as_u64().ok_or_else(bad)?;
            ScalarValue::Uint32(u32::try_from(u).map_err(|_| bad())?)
        }
        FieldKind::Uint64 => ScalarValue::Uint64(v.as_u64().ok_or_else(bad)?),
        FieldKind::Float => ScalarValue::Float(v.as_f64().ok_or_else(bad)? as f32),
        FieldKind::Double => ScalarValue::Double(v.as_f64().ok_or_else(bad)?),
        FieldKind::String => ScalarValue::String(v.as_str().ok_or_else(bad)?.to_string()),
        FieldKind::Bytes => match v {
            serde_json::Value::String(s) => ScalarValue::Bytes(s.as_bytes().to_vec()),
            serde_json::Value::Array(items) => ScalarValue::Bytes(
                items
                    .iter()
                    .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                    .collect::<Option<Vec<u8>>>()
                    .ok_or_else(bad)?,
            ),
            _ => return Err(bad()),
        },
        FieldKind::Enum { .. } => {
            let i = v.as_i64().ok_or_else(bad)?;
            ScalarValue::Enum(i32::try_from(i).map_err(|_| bad())?)
        }
        FieldKind::Message { type_name } => {
            ScalarValue::Message(DynamicRecord::from_json(pool, type_name, v)?.into_ref())
        }
    };
    Ok(scalar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::records_equal;
    use serde_json::json;

    fn pool() -> Arc<DescriptorPool> {
        Arc::new(
            DescriptorPool::from_json(&json!({
                "messages": [
                    {
                        "name": "test.Node",
                        "fields": [
                            { "number": 1, "name": "name", "type": "string" },
                            { "number": 2, "name": "child", "type": "message", "type_name": "test.Node" },
                            { "number": 3, "name": "scores", "type": "int64", "label": "repeated" },
                            { "number": 4, "name": "attrs", "type": "string", "label": "map", "key": "int32" },
                            { "number": 5, "name": "opt", "type": "int64", "optional": true }
                        ]
                    }
                ]
            }))
            .unwrap(),
        )
    }

    #[test]
    fn build_and_read_fields() {
        let pool = pool();
        let mut rec = DynamicRecord::new(&pool, "test.Node").unwrap();
        rec.set("name", ScalarValue::String("root".to_string()))
            .unwrap()
            .push("scores", ScalarValue::Int64(3))
            .unwrap()
            .insert("attrs", MapKey::Int32(7), ScalarValue::String("x".to_string()))
            .unwrap();
        let desc = rec.descriptor().clone();
        let scores = desc.find_field_by_name("scores").unwrap();
        assert_eq!(rec.repeated(scores), &[ScalarValue::Int64(3)]);
        let attrs = desc.find_field_by_name("attrs").unwrap();
        assert_eq!(rec.map_entries(attrs).unwrap().len(), 1);
        assert!(rec.has_field(desc.find_field_by_name("name").unwrap()));
    }

    #[test]
    fn type_checks_on_set() {
        let pool = pool();
        let mut rec = DynamicRecord::new(&pool, "test.Node").unwrap();
        assert!(matches!(
            rec.set("name", ScalarValue::Int64(1)),
            Err(SchemaError::ValueMismatch { .. })
        ));
        assert!(matches!(
            rec.insert("attrs", MapKey::String("k".into()), ScalarValue::String("v".into())),
            Err(SchemaError::ValueMismatch { .. })
        ));
        assert!(matches!(
            rec.set("nope", ScalarValue::Bool(true)),
            Err(SchemaError::NoSuchField { .. })
        ));
    }

    #[test]
    fn presence_and_defaults() {
        let pool = pool();
        let rec = DynamicRecord::from_json(&pool, "test.Node", &json!({ "name": "", "opt": 0 })).unwrap();
        let desc = rec.descriptor().clone();
        // Implicit presence: set to default counts as absent.
        assert!(!rec.has_field(desc.find_field_by_name("name").unwrap()));
        // Explicit presence: set to default counts as present.
        assert!(rec.has_field(desc.find_field_by_name("opt").unwrap()));
        let child = desc.find_field_by_name("child").unwrap();
        assert!(!rec.has_field(child));
        match rec.singular(child) {
            Some(ScalarValue::Message(m)) => assert_eq!(m.descriptor().full_name(), "test.Node"),
            other => panic!("expected empty message default, got {:?}", other),
        }
    }

    #[test]
    fn from_json_nested_and_equality() {
        let pool = pool();
        let doc = json!({
            "name": "a",
            "child": { "name": "b", "scores": [1, 2] },
            "attrs": { "1": "one", "-2": "minus two" }
        });
        let a = DynamicRecord::from_json(&pool, "test.Node", &doc).unwrap();
        let b = DynamicRecord::from_json(&pool, "test.Node", &doc).unwrap();
        assert!(records_equal(&a, &b));
        let c = DynamicRecord::from_json(&pool, "test.Node", &json!({ "name": "a" })).unwrap();
        assert!(!records_equal(&a, &c));
    }

    #[test]
    fn from_json_rejects_bad_map_key() {
        let pool = pool();
        let result = DynamicRecord::from_json(&pool, "test.Node", &json!({ "attrs": { "x": "y" } }));
        assert!(matches!(result, Err(SchemaError::ValueMismatch { .. })));
    }
}

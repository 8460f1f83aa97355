//! Conversion from reflective record fields to runtime values.
//!
//! Scalars widen to the runtime numeric kinds (int32 and enums to `Int`,
//! uint32 to `Uint`, float to `Double`). Records of ordinary types become
//! struct values; well-known types convert to their dedicated
//! representation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use quill_reflect::{FieldDescriptor, MapKey, Record, RecordRef, ScalarValue, WellKnownType};

use crate::error::RuntimeError;
use crate::list::ListValue;
use crate::map::{Key, MapValue};
use crate::strings::{BytesValue, StringValue};
use crate::structs::StructValue;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Unset wrapper-typed fields read as `null` instead of the wrapped
    /// type's zero value.
    pub null_for_unset_wrappers: bool,
    /// Nesting limit for `google.protobuf.Struct`/`Value`/`ListValue`.
    pub max_json_depth: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            null_for_unset_wrappers: true,
            max_json_depth: 100,
        }
    }
}

pub fn scalar_to_value(value: &ScalarValue, options: &ConvertOptions) -> Value {
    match value {
        ScalarValue::Bool(b) => Value::Bool(*b),
        ScalarValue::Int32(i) | ScalarValue::Enum(i) => Value::Int(i64::from(*i)),
        ScalarValue::Int64(i) => Value::Int(*i),
        ScalarValue::Uint32(u) => Value::Uint(u64::from(*u)),
        ScalarValue::Uint64(u) => Value::Uint(*u),
        ScalarValue::Float(f) => Value::Double(f64::from(*f)),
        ScalarValue::Double(d) => Value::Double(*d),
        ScalarValue::String(s) => Value::String(StringValue::new(s.as_str())),
        ScalarValue::Bytes(b) => Value::Bytes(BytesValue::new(b.as_slice())),
        ScalarValue::Message(record) => record_to_value(record, options),
    }
}

pub fn map_key_to_key(key: &MapKey) -> Key {
    match key {
        MapKey::Bool(b) => Key::Bool(*b),
        MapKey::Int32(i) => Key::Int(i64::from(*i)),
        MapKey::Int64(i) => Key::Int(*i),
        MapKey::Uint32(u) => Key::Uint(u64::from(*u)),
        MapKey::Uint64(u) => Key::Uint(*u),
        MapKey::String(s) => Key::String(s.clone()),
    }
}

/// Convert a whole record. Ordinary types become a struct value sharing
/// the record; well-known types become their runtime representation.
pub fn record_to_value(record: &RecordRef, options: &ConvertOptions) -> Value {
    match record.descriptor().well_known() {
        None => Value::Struct(StructValue::Message(RecordRef::clone(record))),
        Some(wkt) => well_known_to_value(record.as_ref(), wkt, options, 0),
    }
}

/// Read one field of `record` as a runtime value. Failures come back as
/// error values.
pub fn field_to_value(record: &dyn Record, field: &FieldDescriptor, options: &ConvertOptions) -> Value {
    if field.is_map() {
        let entries: BTreeMap<Key, Value> = record
            .map_entries(field)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(k, v)| (map_key_to_key(k), scalar_to_value(v, options)))
                    .collect()
            })
            .unwrap_or_default();
        return Value::Map(MapValue::new(entries));
    }
    if field.is_repeated() {
        return Value::List(
            record
                .repeated(field)
                .iter()
                .map(|item| scalar_to_value(item, options))
                .collect(),
        );
    }

    let wkt = field.kind.message_type().and_then(WellKnownType::from_full_name);
    if let Some(wkt) = wkt {
        if !record.has_field(field) {
            if let Some(kind) = wkt.wrapped_kind() {
                if options.null_for_unset_wrappers {
                    return Value::Null;
                }
                return match ScalarValue::default_for(&kind) {
                    Some(zero) => scalar_to_value(&zero, options),
                    None => Value::Null,
                };
            }
            if wkt == WellKnownType::Value {
                return Value::Null;
            }
        }
    }

    match record.singular(field) {
        Some(value) => scalar_to_value(&value, options),
        None => Value::error(RuntimeError::Internal(format!(
            "field {} of {} has no readable value",
            field.name,
            record.descriptor().full_name()
        ))),
    }
}

// ──────────────────────────────────────────────
// Well-known types
// ──────────────────────────────────────────────

fn well_known_to_value(
    record: &dyn Record,
    wkt: WellKnownType,
    options: &ConvertOptions,
    depth: usize,
) -> Value {
    match convert_well_known(record, wkt, options, depth) {
        Ok(value) => value,
        Err(err) => Value::error(err),
    }
}

fn convert_well_known(
    record: &dyn Record,
    wkt: WellKnownType,
    options: &ConvertOptions,
    depth: usize,
) -> Result<Value, RuntimeError> {
    if depth > options.max_json_depth {
        return Err(RuntimeError::InvalidArgument(format!(
            "nesting of {} exceeds depth limit {}",
            wkt.full_name(),
            options.max_json_depth
        )));
    }
    match wkt {
        WellKnownType::Any => Err(RuntimeError::Unimplemented(
            "unpacking google.protobuf.Any".to_string(),
        )),
        WellKnownType::Timestamp => {
            let (seconds, nanos) = seconds_and_nanos(record)?;
            let total = i128::from(seconds) * 1_000_000_000 + i128::from(nanos);
            time::OffsetDateTime::from_unix_timestamp_nanos(total)
                .map(Value::Timestamp)
                .map_err(|e| RuntimeError::InvalidArgument(format!("timestamp out of range: {}", e)))
        }
        WellKnownType::Duration => {
            let (seconds, nanos) = seconds_and_nanos(record)?;
            time::Duration::seconds(seconds)
                .checked_add(time::Duration::nanoseconds(i64::from(nanos)))
                .map(Value::Duration)
                .ok_or_else(|| {
                    RuntimeError::InvalidArgument(format!("duration out of range: {}s {}ns", seconds, nanos))
                })
        }
        WellKnownType::Struct => json_struct(record, options, depth),
        WellKnownType::ListValue => json_list(record, options, depth),
        WellKnownType::Value => json_value(record, options, depth),
        wrapper => {
            let value = singular(record, 1)?;
            if wrapper.wrapped_kind().is_some_and(|kind| value.fits(&kind)) {
                Ok(scalar_to_value(&value, options))
            } else {
                Err(malformed(record))
            }
        }
    }
}

fn malformed(record: &dyn Record) -> RuntimeError {
    RuntimeError::Internal(format!("malformed {}", record.descriptor().full_name()))
}

fn field_by_number(record: &dyn Record, number: u32) -> Result<&FieldDescriptor, RuntimeError> {
    record
        .descriptor()
        .find_field_by_number(number)
        .ok_or_else(|| malformed(record))
}

fn singular(record: &dyn Record, number: u32) -> Result<ScalarValue, RuntimeError> {
    let field = field_by_number(record, number)?;
    record.singular(field).ok_or_else(|| malformed(record))
}

fn seconds_and_nanos(record: &dyn Record) -> Result<(i64, i32), RuntimeError> {
    match (singular(record, 1)?, singular(record, 2)?) {
        (ScalarValue::Int64(seconds), ScalarValue::Int32(nanos)) => Ok((seconds, nanos)),
        _ => Err(malformed(record)),
    }
}

fn nested(value: &ScalarValue, options: &ConvertOptions, depth: usize) -> Result<Value, RuntimeError> {
    match value {
        ScalarValue::Message(inner) => match inner.descriptor().well_known() {
            Some(wkt) => convert_well_known(inner.as_ref(), wkt, options, depth + 1),
            None => Err(malformed(inner.as_ref())),
        },
        _ => Err(RuntimeError::Internal(format!(
            "expected message in JSON container, got {}",
            value.type_name()
        ))),
    }
}

fn json_struct(record: &dyn Record, options: &ConvertOptions, depth: usize) -> Result<Value, RuntimeError> {
    let field = field_by_number(record, 1)?;
    let mut entries = BTreeMap::new();
    if let Some(fields) = record.map_entries(field) {
        for (key, value) in fields {
            entries.insert(map_key_to_key(key), nested(value, options, depth)?);
        }
    }
    Ok(Value::Map(MapValue::new(entries)))
}

fn json_list(record: &dyn Record, options: &ConvertOptions, depth: usize) -> Result<Value, RuntimeError> {
    let field = field_by_number(record, 1)?;
    let items = record
        .repeated(field)
        .iter()
        .map(|item| nested(item, options, depth))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::List(ListValue::new(items)))
}

fn json_value(record: &dyn Record, options: &ConvertOptions, depth: usize) -> Result<Value, RuntimeError> {
    let desc = record.descriptor();
    for field in desc.fields() {
        if !record.has_field(field) {
            continue;
        }
        let value = record.singular(field).ok_or_else(|| malformed(record))?;
        return match (field.number, value) {
            (1, _) => Ok(Value::Null),
            (2, ScalarValue::Double(d)) => Ok(Value::Double(d)),
            (3, ScalarValue::String(s)) => Ok(Value::from(s)),
            (4, ScalarValue::Bool(b)) => Ok(Value::Bool(b)),
            (5, ScalarValue::Message(inner)) | (6, ScalarValue::Message(inner)) => {
                match inner.descriptor().well_known() {
                    Some(wkt @ (WellKnownType::Struct | WellKnownType::ListValue)) => {
                        convert_well_known(inner.as_ref(), wkt, options, depth + 1)
                    }
                    _ => Err(malformed(record)),
                }
            }
            _ => Err(malformed(record)),
        };
    }
    Ok(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatusCode;
    use std::sync::Arc;

    use quill_reflect::{DescriptorPool, DynamicRecord};
    use serde_json::json;

    fn pool() -> Arc<DescriptorPool> {
        let doc = json!({
            "messages": [{
                "name": "test.Holder",
                "fields": [
                    { "number": 1, "name": "count", "type": "int32" },
                    { "number": 2, "name": "wrapped", "type": "message", "type_name": "google.protobuf.Int64Value" },
                    { "number": 3, "name": "when", "type": "message", "type_name": "google.protobuf.Timestamp" },
                    { "number": 4, "name": "span", "type": "message", "type_name": "google.protobuf.Duration" },
                    { "number": 5, "name": "doc", "type": "message", "type_name": "google.protobuf.Struct" },
                    { "number": 6, "name": "any", "type": "message", "type_name": "google.protobuf.Any" },
                    { "number": 7, "name": "ratio", "type": "float" },
                    { "number": 8, "name": "dyn", "type": "message", "type_name": "google.protobuf.Value" }
                ]
            }]
        });
        Arc::new(DescriptorPool::from_json(&doc).unwrap())
    }

    fn field(value: &Value, name: &str) -> Value {
        value.as_struct().unwrap().get_field(name).unwrap()
    }

    #[test]
    fn scalars_widen() {
        let rec = DynamicRecord::from_json(&pool(), "test.Holder", &json!({ "count": 7, "ratio": 0.5 }))
            .unwrap()
            .into_ref();
        let v = record_to_value(&rec, &ConvertOptions::default());
        assert_eq!(v.type_name(), "test.Holder");
        assert!(matches!(field(&v, "count"), Value::Int(7)));
        assert!(matches!(field(&v, "ratio"), Value::Double(d) if d == 0.5));
    }

    #[test]
    fn unset_wrapper_follows_options() {
        let rec = DynamicRecord::new(&pool(), "test.Holder").unwrap().into_ref();
        let desc = rec.descriptor().clone();
        let wrapped = desc.find_field_by_name("wrapped").unwrap();
        assert!(field_to_value(rec.as_ref(), wrapped, &ConvertOptions::default()).is_null());
        let zero = ConvertOptions {
            null_for_unset_wrappers: false,
            ..ConvertOptions::default()
        };
        assert!(matches!(field_to_value(rec.as_ref(), wrapped, &zero), Value::Int(0)));
        let dynamic = desc.find_field_by_name("dyn").unwrap();
        assert!(field_to_value(rec.as_ref(), dynamic, &zero).is_null());
    }

    #[test]
    fn well_known_fields_convert() {
        let rec = DynamicRecord::from_json(
            &pool(),
            "test.Holder",
            &json!({
                "wrapped": { "value": 42 },
                "when": { "seconds": 1, "nanos": 500 },
                "span": { "seconds": 2, "nanos": 0 },
                "doc": { "fields": {
                    "a": { "number_value": 1.0 },
                    "b": { "list_value": { "values": [ { "string_value": "x" }, { "bool_value": true } ] } },
                    "c": { "null_value": 0 }
                } }
            }),
        )
        .unwrap()
        .into_ref();
        let v = record_to_value(&rec, &ConvertOptions::default());
        assert!(matches!(field(&v, "wrapped"), Value::Int(42)));
        match field(&v, "when") {
            Value::Timestamp(t) => {
                assert_eq!(t.unix_timestamp(), 1);
                assert_eq!(t.nanosecond(), 500);
            }
            other => panic!("expected timestamp, got {:?}", other),
        }
        assert!(matches!(field(&v, "span"), Value::Duration(d) if d == time::Duration::seconds(2)));

        let doc = field(&v, "doc");
        let map = doc.as_map().unwrap();
        assert_eq!(map.get(&Key::from("a")), Some(&Value::Double(1.0)));
        let list = map.get(&Key::from("b")).unwrap().as_list().unwrap();
        assert_eq!(list.get(0), Some(&Value::from("x")));
        assert_eq!(list.get(1), Some(&Value::Bool(true)));
        assert!(map.get(&Key::from("c")).unwrap().is_null());
    }

    #[test]
    fn overflowing_duration_is_an_error_value() {
        let rec = DynamicRecord::from_json(
            &pool(),
            "test.Holder",
            &json!({ "span": { "seconds": i64::MAX, "nanos": 1_000_000_000 } }),
        )
        .unwrap()
        .into_ref();
        let v = record_to_value(&rec, &ConvertOptions::default());
        let span = field(&v, "span");
        assert_eq!(span.as_error().map(RuntimeError::code), Some(StatusCode::InvalidArgument));

        let rec = DynamicRecord::from_json(
            &pool(),
            "test.Holder",
            &json!({ "span": { "seconds": -1, "nanos": -500_000_000 } }),
        )
        .unwrap()
        .into_ref();
        let v = record_to_value(&rec, &ConvertOptions::default());
        assert!(matches!(field(&v, "span"), Value::Duration(d) if d == time::Duration::milliseconds(-1500)));
    }

    #[test]
    fn any_is_unimplemented() {
        let rec = DynamicRecord::from_json(
            &pool(),
            "test.Holder",
            &json!({ "any": { "type_url": "type.googleapis.com/x.Y" } }),
        )
        .unwrap()
        .into_ref();
        let v = record_to_value(&rec, &ConvertOptions::default());
        assert!(matches!(field(&v, "any").as_error(), Some(RuntimeError::Unimplemented(_))));
    }

    #[test]
    fn depth_limit() {
        let rec = DynamicRecord::from_json(
            &pool(),
            "test.Holder",
            &json!({ "doc": { "fields": {
                "a": { "struct_value": { "fields": { "b": { "number_value": 1.0 } } } }
            } } }),
        )
        .unwrap()
        .into_ref();
        let shallow = ConvertOptions {
            max_json_depth: 2,
            ..ConvertOptions::default()
        };
        let v = record_to_value(&rec, &shallow);
        let doc = v.as_struct().unwrap().get_field_with("doc", &shallow).unwrap();
        assert!(matches!(doc.as_error(), Some(RuntimeError::InvalidArgument(_))));
        let v = record_to_value(&rec, &ConvertOptions::default());
        assert!(field(&v, "doc").as_map().is_some());
    }
}

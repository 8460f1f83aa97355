//! JSON interop for runtime values.
//!
//! Bytes are base64 encoded, durations render as `"1.5s"`, timestamps as
//! RFC 3339, and non-finite doubles as `"NaN"`, `"Infinity"` and
//! `"-Infinity"`. Struct values render as an object of their set fields.
//! Error and unknown values have no JSON form.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Serialize, Serializer};

use crate::error::RuntimeError;
use crate::list::ListValue;
use crate::map::{Key, MapValue};
use crate::structs::StructValue;
use crate::value::{format_duration, format_timestamp, Value};

impl Value {
    pub fn to_json(&self) -> Result<serde_json::Value, RuntimeError> {
        let json = match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Uint(u) => serde_json::Value::from(*u),
            Value::Double(d) => double_to_json(*d),
            Value::String(s) => serde_json::Value::String(s.as_str().to_string()),
            Value::Bytes(b) => serde_json::Value::String(BASE64.encode(b.as_slice())),
            Value::Duration(d) => serde_json::Value::String(format_duration(d)),
            Value::Timestamp(t) => serde_json::Value::String(format_timestamp(t)?),
            Value::List(list) => serde_json::Value::Array(
                list.iter().map(Value::to_json).collect::<Result<_, _>>()?,
            ),
            Value::Map(map) => {
                let mut obj = serde_json::Map::new();
                for (key, value) in map.iter() {
                    let name = key_to_json(key);
                    if obj.contains_key(&name) {
                        return Err(RuntimeError::InvalidArgument(format!(
                            "map keys collide on JSON name {:?}",
                            name
                        )));
                    }
                    obj.insert(name, value.to_json()?);
                }
                serde_json::Value::Object(obj)
            }
            Value::Struct(s) => struct_to_json(s)?,
            Value::Type(t) => serde_json::Value::String(t.name().to_string()),
            Value::Error(e) => return Err(e.error().clone()),
            Value::Unknown(u) => {
                return Err(RuntimeError::InvalidArgument(format!(
                    "unknown value over {} attribute(s) has no JSON form",
                    u.len()
                )))
            }
        };
        Ok(json)
    }

    /// Build a value from JSON. Numbers become doubles, as JSON does not
    /// distinguish integer kinds.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s.as_str()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect::<ListValue>())
            }
            serde_json::Value::Object(obj) => Value::Map(
                obj.iter()
                    .map(|(k, v)| (Key::from(k.as_str()), Value::from_json(v)))
                    .collect::<MapValue>(),
            ),
        }
    }
}

fn double_to_json(d: f64) -> serde_json::Value {
    match serde_json::Number::from_f64(d) {
        Some(n) => serde_json::Value::Number(n),
        None if d.is_nan() => serde_json::Value::String("NaN".to_string()),
        None if d > 0.0 => serde_json::Value::String("Infinity".to_string()),
        None => serde_json::Value::String("-Infinity".to_string()),
    }
}

fn key_to_json(key: &Key) -> String {
    match key {
        Key::Bool(b) => b.to_string(),
        Key::Int(i) => i.to_string(),
        Key::Uint(u) => u.to_string(),
        Key::String(s) => s.clone(),
    }
}

fn struct_to_json(s: &StructValue) -> Result<serde_json::Value, RuntimeError> {
    let mut obj = serde_json::Map::new();
    for name in s.field_names() {
        if !s.has_field(&name)? {
            continue;
        }
        let value = s.get_field(&name)?;
        obj.insert(name, value.to_json()?);
    }
    Ok(serde_json::Value::Object(obj))
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;
    use crate::map::MapBuilder;
    use crate::unknown::UnknownSet;
    use serde_json::json;

    #[test]
    fn scalars_and_containers() {
        let mut map = MapBuilder::new();
        map.insert("b", Value::from(vec![1u8, 2, 3]));
        map.insert(7i64, Value::from(time::Duration::milliseconds(250)));
        map.insert(true, Value::List(ListValue::new(vec![Value::Uint(1), Value::Double(f64::INFINITY)])));
        let json = Value::Map(map.build()).to_json().unwrap();
        assert_eq!(
            json,
            json!({ "b": "AQID", "7": "0.25s", "true": [1, "Infinity"] })
        );
    }

    #[test]
    fn signed_and_unsigned_keys_render_once() {
        let mut map = MapBuilder::new();
        map.insert(1i64, "signed");
        map.insert(1u64, "unsigned");
        let json = Value::Map(map.build()).to_json().unwrap();
        assert_eq!(json, json!({ "1": "unsigned" }));
    }

    #[test]
    fn colliding_key_names_refuse() {
        let mut map = MapBuilder::new();
        map.insert(true, 1i64);
        map.insert("true", 2i64);
        assert!(matches!(
            Value::Map(map.build()).to_json(),
            Err(RuntimeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn timestamps_render_rfc3339() {
        let t = Value::from(time::macros::datetime!(2023-06-01 12:00:00 UTC));
        assert_eq!(t.to_json().unwrap(), json!("2023-06-01T12:00:00Z"));
    }

    #[test]
    fn errors_and_unknowns_refuse() {
        let err = Value::error(RuntimeError::Internal("x".into()));
        assert_eq!(err.to_json().unwrap_err(), RuntimeError::Internal("x".into()));
        let unknown = Value::Unknown(UnknownSet::from_attribute(Attribute::variable("a")));
        assert!(unknown.to_json().is_err());
        assert!(serde_json::to_string(&unknown).is_err());
    }

    #[test]
    fn from_json_builds_doubles_and_maps() {
        let v = Value::from_json(&json!({ "n": 3, "l": [true, null, "s"] }));
        let map = v.as_map().unwrap();
        assert_eq!(map.get(&Key::from("n")), Some(&Value::Double(3.0)));
        assert_eq!(map.get(&Key::from("n")), Some(&Value::Int(3)));
        let list = map.get(&Key::from("l")).unwrap().as_list().unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.get(1).unwrap().is_null());
        assert_eq!(serde_json::to_value(&v).unwrap(), json!({ "n": 3.0, "l": [true, null, "s"] }));
    }
}

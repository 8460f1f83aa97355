//! Conversion between runtime values and legacy values.
//!
//! Records, lists and maps cross without copying when the other side can
//! view the same body; owned legacy containers are materialized element
//! by element.

use std::sync::Arc;

use quill_value::{
    record_to_value, ConvertOptions, ErrorValue, Key, MapBuilder, RuntimeError, StringValue, TypeValue,
    Value,
};

use crate::value::{LegacyList, LegacyMap, LegacyStatus, LegacyValue};

pub fn to_legacy(value: &Value) -> Result<LegacyValue, RuntimeError> {
    let legacy = match value {
        Value::Null => LegacyValue::Null,
        Value::Bool(b) => LegacyValue::Bool(*b),
        Value::Int(i) => LegacyValue::Int64(*i),
        Value::Uint(u) => LegacyValue::Uint64(*u),
        Value::Double(d) => LegacyValue::Double(*d),
        Value::String(s) => LegacyValue::String(s.as_str().into()),
        Value::Bytes(b) => LegacyValue::Bytes(b.as_slice().into()),
        Value::Duration(d) => LegacyValue::Duration(*d),
        Value::Timestamp(t) => LegacyValue::Timestamp(*t),
        Value::List(list) => LegacyValue::List(LegacyList::Modern(list.clone())),
        Value::Map(map) => LegacyValue::Map(LegacyMap::Modern(map.clone())),
        Value::Struct(s) => match s.as_record() {
            Some(record) => LegacyValue::Message(record),
            None => {
                tracing::debug!(type_name = s.type_name(), "struct has no legacy form");
                return Err(RuntimeError::unsupported_conversion(s.type_name(), "legacy value"));
            }
        },
        Value::Type(t) => LegacyValue::Type(t.name().into()),
        Value::Error(e) => LegacyValue::Error(Arc::new(status_of(e))),
        Value::Unknown(u) => LegacyValue::Unknown(Arc::new(u.clone())),
    };
    Ok(legacy)
}

fn status_of(error: &ErrorValue) -> LegacyStatus {
    match error.error() {
        RuntimeError::Status { code, message } => LegacyStatus::new(*code, message),
        other => LegacyStatus::new(other.code(), &other.to_string()),
    }
}

pub fn from_legacy(value: &LegacyValue) -> Result<Value, RuntimeError> {
    let modern = match value {
        LegacyValue::Null => Value::Null,
        LegacyValue::Bool(b) => Value::Bool(*b),
        LegacyValue::Int64(i) => Value::Int(*i),
        LegacyValue::Uint64(u) => Value::Uint(*u),
        LegacyValue::Double(d) => Value::Double(*d),
        LegacyValue::String(s) => Value::String(StringValue::new(&**s)),
        LegacyValue::Bytes(b) => Value::from(b.to_vec()),
        LegacyValue::Duration(d) => Value::Duration(*d),
        LegacyValue::Timestamp(t) => Value::Timestamp(*t),
        LegacyValue::Message(record) => record_to_value(record, &ConvertOptions::default()),
        LegacyValue::List(LegacyList::Modern(list)) => Value::List(list.clone()),
        LegacyValue::List(LegacyList::Owned(items)) => Value::List(
            items
                .iter()
                .map(from_legacy)
                .collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .collect(),
        ),
        LegacyValue::Map(LegacyMap::Modern(map)) => Value::Map(map.clone()),
        LegacyValue::Map(LegacyMap::Owned(entries)) => {
            let mut builder = MapBuilder::new();
            for (k, v) in entries.iter() {
                let key = Key::from_value(&from_legacy(k)?)?;
                builder.insert(key, from_legacy(v)?);
            }
            Value::Map(builder.build())
        }
        LegacyValue::Type(name) => Value::Type(TypeValue::new(name)),
        LegacyValue::Error(status) => Value::error(RuntimeError::Status {
            code: status.code,
            message: status.message.clone(),
        }),
        LegacyValue::Unknown(set) => Value::Unknown(set.as_ref().clone()),
        LegacyValue::Special(marker) => {
            tracing::debug!(?marker, "special legacy marker reached the bridge");
            return Err(RuntimeError::Internal(format!(
                "legacy marker {:?} has no runtime value",
                marker
            )));
        }
    };
    Ok(modern)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_value::{ListValue, StatusCode};

    #[test]
    fn containers_cross_without_copy() {
        let list = ListValue::new(vec![Value::Int(1)]);
        let legacy = to_legacy(&Value::List(list.clone())).unwrap();
        match from_legacy(&legacy).unwrap() {
            Value::List(back) => assert!(back.ptr_eq(&list)),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn owned_containers_materialize() {
        let legacy = LegacyValue::map(vec![
            (LegacyValue::string("a"), LegacyValue::list(vec![LegacyValue::Int64(1), LegacyValue::Null])),
            (LegacyValue::Uint64(2), LegacyValue::Bool(true)),
        ]);
        let value = from_legacy(&legacy).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&Key::Int(2)), Some(&Value::Bool(true)));
        assert_eq!(map.get(&Key::from("a")).and_then(|v| v.as_list()).map(|l| l.len()), Some(2));
    }

    #[test]
    fn errors_round_trip_through_status() {
        let err = Value::error(RuntimeError::NoSuchKey { key: "\"k\"".into() });
        let legacy = to_legacy(&err).unwrap();
        match &legacy {
            LegacyValue::Error(status) => {
                assert_eq!(status.code, StatusCode::NotFound);
                assert_eq!(status.message, "key not found in map: \"k\"");
            }
            other => panic!("expected error, got {:?}", other),
        }
        let back = from_legacy(&legacy).unwrap();
        assert_eq!(back.as_error().map(RuntimeError::code), Some(StatusCode::NotFound));
        let again = to_legacy(&back).unwrap();
        match again {
            LegacyValue::Error(status) => assert_eq!(status.message, "key not found in map: \"k\""),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[test]
    fn special_marker_is_internal() {
        let err = from_legacy(&LegacyValue::Special(crate::SpecialMarker::Uninitialized)).unwrap_err();
        assert!(matches!(err, RuntimeError::Internal(_)));
    }

    #[test]
    fn bad_owned_key_fails() {
        let legacy = LegacyValue::map(vec![(LegacyValue::Double(1.0), LegacyValue::Null)]);
        assert!(matches!(
            from_legacy(&legacy),
            Err(RuntimeError::InvalidMapKeyType { .. })
        ));
    }
}

//! Equality over legacy values, and across the two representations.
//!
//! Same three-valued contract as the runtime model: numbers compare by
//! value across int64, uint64 and double; errors are never equal; an
//! unknown operand makes the result undefined (`None`), and an undefined
//! element makes a container comparison undefined.

use std::cmp::Ordering;
use std::sync::Arc;

use quill_reflect::records_equal;
use quill_value::{heterogeneous_compare, heterogeneous_equal, Value};

use crate::convert::from_legacy;
use crate::value::{LegacyList, LegacyMap, LegacyValue};

pub fn legacy_equal(a: &LegacyValue, b: &LegacyValue) -> Option<bool> {
    match (a, b) {
        (LegacyValue::Unknown(_), _) | (_, LegacyValue::Unknown(_)) => return None,
        (LegacyValue::Special(_), _) | (_, LegacyValue::Special(_)) => return None,
        (LegacyValue::Error(_), _) | (_, LegacyValue::Error(_)) => return Some(false),
        _ => {}
    }
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return Some(heterogeneous_compare(&x, &y) == Some(Ordering::Equal));
    }
    match (a, b) {
        (LegacyValue::Null, LegacyValue::Null) => Some(true),
        (LegacyValue::Bool(x), LegacyValue::Bool(y)) => Some(x == y),
        (LegacyValue::String(x), LegacyValue::String(y)) => Some(x == y),
        (LegacyValue::Bytes(x), LegacyValue::Bytes(y)) => Some(x == y),
        (LegacyValue::Duration(x), LegacyValue::Duration(y)) => Some(x == y),
        (LegacyValue::Timestamp(x), LegacyValue::Timestamp(y)) => Some(x == y),
        (LegacyValue::Type(x), LegacyValue::Type(y)) => Some(x == y),
        (LegacyValue::Message(x), LegacyValue::Message(y)) => {
            Some(Arc::ptr_eq(x, y) || records_equal(x.as_ref(), y.as_ref()))
        }
        (LegacyValue::List(x), LegacyValue::List(y)) => list_equal(x, y),
        (LegacyValue::Map(x), LegacyValue::Map(y)) => map_equal(x, y),
        _ => Some(false),
    }
}

/// Common numeric representation used for cross-kind comparison.
fn as_number(v: &LegacyValue) -> Option<Value> {
    match v {
        LegacyValue::Int64(i) => Some(Value::Int(*i)),
        LegacyValue::Uint64(u) => Some(Value::Uint(*u)),
        LegacyValue::Double(d) => Some(Value::Double(*d)),
        _ => None,
    }
}

fn list_equal(a: &LegacyList, b: &LegacyList) -> Option<bool> {
    if let (LegacyList::Modern(x), LegacyList::Modern(y)) = (a, b) {
        if x.ptr_eq(y) {
            return Some(true);
        }
    }
    if a.len() != b.len() {
        return Some(false);
    }
    let mut equal = true;
    for index in 0..a.len() {
        let (x, y) = match (a.get(index), b.get(index)) {
            (Ok(Some(x)), Ok(Some(y))) => (x, y),
            _ => return None,
        };
        match legacy_equal(&x, &y) {
            None => return None,
            Some(false) => equal = false,
            Some(true) => {}
        }
    }
    Some(equal)
}

fn map_equal(a: &LegacyMap, b: &LegacyMap) -> Option<bool> {
    if let (LegacyMap::Modern(x), LegacyMap::Modern(y)) = (a, b) {
        if x.ptr_eq(y) {
            return Some(true);
        }
    }
    if a.len() != b.len() {
        return Some(false);
    }
    let entries = a.entries().ok()?;
    let mut equal = true;
    for (key, value) in &entries {
        match b.get(key) {
            Ok(Some(other)) => match legacy_equal(value, &other) {
                None => return None,
                Some(false) => equal = false,
                Some(true) => {}
            },
            Ok(None) | Err(_) => equal = false,
        }
    }
    Some(equal)
}

/// Compare a legacy value with a runtime value. A legacy value that
/// cannot cross the bridge compares as undefined.
pub fn cross_equal(legacy: &LegacyValue, value: &Value) -> Option<bool> {
    match from_legacy(legacy) {
        Ok(converted) => heterogeneous_equal(&converted, value),
        Err(error) => {
            tracing::debug!(%error, legacy_type = legacy.type_name(), "cross-representation comparison undefined");
            None
        }
    }
}

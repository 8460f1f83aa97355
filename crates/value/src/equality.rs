//! Heterogeneous equality and ordering.
//!
//! Int, Uint and Double compare by numeric value. The result is
//! three-valued: `Some(true)`, `Some(false)`, or `None` for "undefined",
//! which any `Unknown` operand produces. Errors are never equal to
//! anything, including another error.
//!
//! Inside lists and maps an undefined element makes the whole comparison
//! undefined, regardless of where it sits relative to a definite
//! mismatch. Only a size mismatch short-circuits to `false`.

use std::cmp::Ordering;

use crate::structs::struct_equal;
use crate::value::Value;

const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

pub fn heterogeneous_equal(a: &Value, b: &Value) -> Option<bool> {
    if a.is_unknown() || b.is_unknown() {
        return None;
    }
    if a.is_error() || b.is_error() {
        return Some(false);
    }
    if a.kind().is_numeric() && b.kind().is_numeric() {
        return Some(compare_numeric(a, b) == Some(Ordering::Equal));
    }
    match (a, b) {
        (Value::Null, Value::Null) => Some(true),
        (Value::Bool(x), Value::Bool(y)) => Some(x == y),
        (Value::String(x), Value::String(y)) => Some(x.ptr_eq(y) || x.as_str() == y.as_str()),
        (Value::Bytes(x), Value::Bytes(y)) => Some(x == y),
        (Value::Duration(x), Value::Duration(y)) => Some(x == y),
        (Value::Timestamp(x), Value::Timestamp(y)) => Some(x == y),
        (Value::Type(x), Value::Type(y)) => Some(x == y),
        (Value::List(x), Value::List(y)) => {
            if x.ptr_eq(y) {
                return Some(true);
            }
            if x.len() != y.len() {
                return Some(false);
            }
            combine(x.iter().zip(y.iter()).map(|(l, r)| heterogeneous_equal(l, r)))
        }
        (Value::Map(x), Value::Map(y)) => {
            if x.ptr_eq(y) {
                return Some(true);
            }
            if x.len() != y.len() {
                return Some(false);
            }
            combine(x.iter().map(|(key, l)| match y.get(key) {
                Some(r) => heterogeneous_equal(l, r),
                None => Some(false),
            }))
        }
        (Value::Struct(x), Value::Struct(y)) => struct_equal(x, y),
        _ => Some(false),
    }
}

/// Fold element results: any undefined wins, then any mismatch.
fn combine(results: impl Iterator<Item = Option<bool>>) -> Option<bool> {
    let mut equal = true;
    for result in results {
        match result {
            None => return None,
            Some(false) => equal = false,
            Some(true) => {}
        }
    }
    Some(equal)
}

/// Ordering for comparable kinds. Numerics order across Int, Uint and
/// Double; NaN and mixed non-numeric kinds have no ordering.
pub fn heterogeneous_compare(a: &Value, b: &Value) -> Option<Ordering> {
    if a.kind().is_numeric() && b.kind().is_numeric() {
        return compare_numeric(a, b);
    }
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bytes(x), Value::Bytes(y)) => Some(x.as_slice().cmp(y.as_slice())),
        (Value::Duration(x), Value::Duration(y)) => Some(x.cmp(y)),
        (Value::Timestamp(x), Value::Timestamp(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn compare_numeric(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        (Value::Uint(x), Value::Uint(y)) => Some(x.cmp(y)),
        (Value::Double(x), Value::Double(y)) => x.partial_cmp(y),
        (Value::Int(x), Value::Uint(y)) => Some(compare_int_uint(*x, *y)),
        (Value::Uint(x), Value::Int(y)) => Some(compare_int_uint(*y, *x).reverse()),
        (Value::Int(x), Value::Double(y)) => compare_int_double(*x, *y),
        (Value::Double(x), Value::Int(y)) => compare_int_double(*y, *x).map(Ordering::reverse),
        (Value::Uint(x), Value::Double(y)) => compare_uint_double(*x, *y),
        (Value::Double(x), Value::Uint(y)) => compare_uint_double(*y, *x).map(Ordering::reverse),
        _ => None,
    }
}

fn compare_int_uint(i: i64, u: u64) -> Ordering {
    match u64::try_from(i) {
        Ok(i) => i.cmp(&u),
        Err(_) => Ordering::Less,
    }
}

fn compare_int_double(i: i64, d: f64) -> Option<Ordering> {
    if d.is_nan() {
        return None;
    }
    if d < -TWO_POW_63 {
        return Some(Ordering::Greater);
    }
    if d >= TWO_POW_63 {
        return Some(Ordering::Less);
    }
    let whole = d.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => whole.partial_cmp(&d),
        other => Some(other),
    }
}

fn compare_uint_double(u: u64, d: f64) -> Option<Ordering> {
    if d.is_nan() {
        return None;
    }
    if d < 0.0 {
        return Some(Ordering::Greater);
    }
    if d >= TWO_POW_64 {
        return Some(Ordering::Less);
    }
    let whole = d.trunc();
    match u.cmp(&(whole as u64)) {
        Ordering::Equal => whole.partial_cmp(&d),
        other => Some(other),
    }
}

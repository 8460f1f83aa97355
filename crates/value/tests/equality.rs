//! Three-valued heterogeneous equality over runtime values.

use std::cmp::Ordering;

use quill_value::{
    heterogeneous_compare, heterogeneous_equal, Attribute, ListValue, MapBuilder, RuntimeError, UnknownSet,
    Value,
};

fn unknown(name: &str) -> Value {
    Value::Unknown(UnknownSet::from_attribute(Attribute::variable(name)))
}

fn list(items: Vec<Value>) -> Value {
    Value::List(ListValue::new(items))
}

// ──────────────────────────────────────────────
// Scalars
// ──────────────────────────────────────────────

#[test]
fn numbers_equal_across_kinds() {
    assert_eq!(heterogeneous_equal(&Value::Int(1), &Value::Uint(1)), Some(true));
    assert_eq!(heterogeneous_equal(&Value::Uint(2), &Value::Double(2.0)), Some(true));
    assert_eq!(heterogeneous_equal(&Value::Int(-1), &Value::Uint(u64::MAX)), Some(false));
    assert_eq!(heterogeneous_equal(&Value::Double(f64::NAN), &Value::Double(f64::NAN)), Some(false));
    assert_eq!(
        heterogeneous_equal(&Value::Int(i64::MAX), &Value::Double(9_223_372_036_854_775_808.0)),
        Some(false)
    );
}

#[test]
fn different_kinds_are_unequal() {
    assert_eq!(heterogeneous_equal(&Value::Int(1), &Value::from("1")), Some(false));
    assert_eq!(heterogeneous_equal(&Value::Null, &Value::Bool(false)), Some(false));
    assert_eq!(heterogeneous_equal(&Value::from("a"), &Value::from(vec![b'a'])), Some(false));
}

#[test]
fn errors_never_equal() {
    let err = Value::error(RuntimeError::Internal("x".into()));
    assert_eq!(heterogeneous_equal(&err, &err.clone()), Some(false));
    assert_eq!(heterogeneous_equal(&err, &Value::Null), Some(false));
}

#[test]
fn unknown_dominates_error() {
    let err = Value::error(RuntimeError::Internal("x".into()));
    assert_eq!(heterogeneous_equal(&unknown("u"), &err), None);
    assert_eq!(heterogeneous_equal(&err, &unknown("u")), None);
}

// ──────────────────────────────────────────────
// Containers
// ──────────────────────────────────────────────

#[test]
fn lists_compare_elementwise() {
    let a = list(vec![Value::Int(1), Value::from("x")]);
    let b = list(vec![Value::Double(1.0), Value::from("x")]);
    assert_eq!(heterogeneous_equal(&a, &b), Some(true));
    assert_eq!(a, b);
}

#[test]
fn size_mismatch_is_false_even_with_unknowns() {
    let a = list(vec![unknown("u")]);
    let b = list(vec![Value::Int(1), Value::Int(2)]);
    assert_eq!(heterogeneous_equal(&a, &b), Some(false));
}

#[test]
fn undefined_element_wins_over_mismatch() {
    let a = list(vec![Value::Int(1), unknown("u")]);
    let b = list(vec![Value::Int(2), Value::Int(3)]);
    assert_eq!(heterogeneous_equal(&a, &b), None);
    let c = list(vec![unknown("u"), Value::Int(1)]);
    let d = list(vec![Value::Int(0), Value::Int(2)]);
    assert_eq!(heterogeneous_equal(&c, &d), None);
}

#[test]
fn maps_compare_by_key_with_numeric_aliasing() {
    let mut a = MapBuilder::new();
    a.insert(1i64, "one");
    let mut b = MapBuilder::new();
    b.insert(1u64, "one");
    let mut c = MapBuilder::new();
    c.insert(2i64, "one");
    let (a, b, c) = (Value::Map(a.build()), Value::Map(b.build()), Value::Map(c.build()));
    assert_eq!(heterogeneous_equal(&a, &b), Some(true));
    assert_eq!(heterogeneous_equal(&a, &c), Some(false));
}

#[test]
fn map_equality_is_symmetric_across_key_signedness() {
    let mut a = MapBuilder::new();
    a.insert(1i64, "x");
    a.insert(1u64, "x");
    let mut b = MapBuilder::new();
    b.insert(1i64, "x");
    b.insert(2i64, "y");
    let (a, b) = (a.build(), b.build());
    assert_eq!(a.len(), 1);
    let (a, b) = (Value::Map(a), Value::Map(b));
    assert_eq!(heterogeneous_equal(&a, &b), Some(false));
    assert_eq!(heterogeneous_equal(&b, &a), Some(false));
}

#[test]
fn shared_list_is_equal_to_itself() {
    let a = list(vec![Value::Double(f64::NAN)]);
    assert_eq!(heterogeneous_equal(&a, &a.clone()), Some(true));
}

// ──────────────────────────────────────────────
// Ordering
// ──────────────────────────────────────────────

#[test]
fn ordering_across_numeric_kinds() {
    assert_eq!(heterogeneous_compare(&Value::Int(-1), &Value::Uint(0)), Some(Ordering::Less));
    assert_eq!(heterogeneous_compare(&Value::Uint(3), &Value::Double(2.5)), Some(Ordering::Greater));
    assert_eq!(heterogeneous_compare(&Value::Double(f64::NAN), &Value::Int(0)), None);
    assert_eq!(heterogeneous_compare(&Value::from("a"), &Value::from("b")), Some(Ordering::Less));
    assert_eq!(heterogeneous_compare(&Value::from("a"), &Value::Int(1)), None);
}

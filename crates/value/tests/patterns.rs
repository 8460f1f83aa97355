//! Attribute paths and caller-declared unknown/missing patterns.

use quill_value::{
    Attribute, AttributePattern, AttributeQualifier, AttributeQualifierPattern, Kind, MatchType, PatternSet,
    RuntimeError, Value,
};
use serde_json::json;

fn request_path() -> Attribute {
    Attribute::variable("request").step("auth").step("claims").step(0i64)
}

// ──────────────────────────────────────────────
// Attribute rendering
// ──────────────────────────────────────────────

#[test]
fn attribute_renders_fields_and_keys() {
    assert_eq!(request_path().as_string().unwrap(), "request.auth.claims[0]");
    let attr = Attribute::variable("m").step(3u64).step(true).step("two words");
    assert_eq!(attr.as_string().unwrap(), "m[3u][true][\"two words\"]");
}

#[test]
fn non_key_qualifier_cannot_render() {
    let attr = Attribute::variable("m").step(AttributeQualifier::TypeKind(Kind::Double));
    assert!(matches!(attr.as_string(), Err(RuntimeError::InvalidArgument(_))));
}

// ──────────────────────────────────────────────
// Pattern matching
// ──────────────────────────────────────────────

#[test]
fn wildcard_matches_any_qualifier() {
    let pattern = AttributePattern::new(
        "request",
        vec![
            AttributeQualifierPattern::of("auth"),
            AttributeQualifierPattern::wildcard(),
        ],
    );
    assert_eq!(pattern.is_match(&request_path()), MatchType::FullMatch);
    assert_eq!(
        pattern.is_match(&Attribute::variable("request").step("auth")),
        MatchType::PartialMatch
    );
    assert_eq!(
        pattern.is_match(&Attribute::variable("request").step("body")),
        MatchType::NoMatch
    );
}

#[test]
fn qualifier_kinds_must_agree() {
    let pattern = AttributePattern::new("m", vec![AttributeQualifierPattern::of(1i64)]);
    assert_eq!(pattern.is_match(&Attribute::variable("m").step(1i64)), MatchType::FullMatch);
    assert_eq!(pattern.is_match(&Attribute::variable("m").step("1")), MatchType::NoMatch);
}

#[test]
fn pattern_set_loads_from_json() {
    let set: PatternSet = serde_json::from_value(json!({
        "unknown_patterns": [
            { "variable": "request", "qualifier_path": [ { "string": "auth" }, null ] }
        ],
        "missing_patterns": [
            { "variable": "env" }
        ]
    }))
    .unwrap();
    assert_eq!(set.unknown_patterns.len(), 1);
    assert!(set.unknown_patterns[0].qualifier_path()[1].is_wildcard());
    assert!(set.missing_patterns[0].qualifier_path().is_empty());
}

// ──────────────────────────────────────────────
// Unknown and missing checks
// ──────────────────────────────────────────────

#[test]
fn unknown_checks_respect_partial_flag() {
    let set = PatternSet::new(
        vec![AttributePattern::new(
            "request",
            vec![AttributeQualifierPattern::of("auth"), AttributeQualifierPattern::of("claims")],
        )],
        vec![],
    );
    let prefix = Attribute::variable("request").step("auth");
    assert!(!set.check_for_unknown(&prefix, false));
    assert!(set.check_for_unknown(&prefix, true));
    assert!(set.check_for_unknown(&request_path(), false));

    match set.unknown_for(&request_path(), false) {
        Some(Value::Unknown(unknown)) => assert!(unknown.contains(&request_path())),
        other => panic!("expected unknown, got {:?}", other),
    }
    assert!(set.unknown_for(&Attribute::variable("other"), true).is_none());
}

#[test]
fn missing_attribute_yields_error_value() {
    let set = PatternSet::new(vec![], vec![AttributePattern::new("env", vec![])]);
    let attr = Attribute::variable("env").step("HOME");
    let value = set.check_for_missing(&attr).unwrap();
    match value.as_error() {
        Some(RuntimeError::MissingAttribute { attribute }) => assert_eq!(attribute, "env.HOME"),
        other => panic!("expected missing attribute, got {:?}", other),
    }
    assert!(set.check_for_missing(&Attribute::variable("request")).is_none());
}

#[test]
fn empty_set_matches_nothing() {
    let set = PatternSet::default();
    assert!(set.is_empty());
    assert!(!set.check_for_unknown(&request_path(), true));
    assert!(set.check_for_missing(&request_path()).is_none());
}

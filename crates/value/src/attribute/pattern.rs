use serde::{Deserialize, Serialize};

use super::path::Attribute;
use super::qualifier::AttributeQualifier;
use crate::value::Value;

/// One segment of an attribute pattern. `None` is a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeQualifierPattern {
    value: Option<AttributeQualifier>,
}

impl AttributeQualifierPattern {
    pub fn wildcard() -> Self {
        AttributeQualifierPattern { value: None }
    }

    pub fn of(qualifier: impl Into<AttributeQualifier>) -> Self {
        AttributeQualifierPattern {
            value: Some(qualifier.into()),
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.value.is_none()
    }

    pub fn qualifier(&self) -> Option<&AttributeQualifier> {
        self.value.as_ref()
    }

    pub fn is_match(&self, qualifier: &AttributeQualifier) -> bool {
        match &self.value {
            None => true,
            Some(AttributeQualifier::String(s)) => qualifier.is_match_str(s),
            Some(expected) => expected == qualifier,
        }
    }

    /// Match against a runtime key value. Keys of a kind that cannot be
    /// a qualifier only match a wildcard.
    pub fn matches_value(&self, value: &Value) -> bool {
        match &self.value {
            None => true,
            Some(expected) => match AttributeQualifier::from_value(value) {
                AttributeQualifier::TypeKind(_) => false,
                actual => expected == &actual,
            },
        }
    }
}

/// Result of matching a pattern against a concrete attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    NoMatch,
    /// The pattern is longer than the attribute and agrees on every
    /// segment the attribute has.
    PartialMatch,
    FullMatch,
}

/// A possibly wildcarded template over attributes, as supplied by callers
/// declaring unknown or missing inputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributePattern {
    variable: String,
    #[serde(default)]
    qualifier_path: Vec<AttributeQualifierPattern>,
}

impl AttributePattern {
    pub fn new(variable: &str, qualifier_path: Vec<AttributeQualifierPattern>) -> Self {
        AttributePattern {
            variable: variable.to_string(),
            qualifier_path,
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn qualifier_path(&self) -> &[AttributeQualifierPattern] {
        &self.qualifier_path
    }

    /// Prefix match against `attribute`. Full match needs the attribute to
    /// be at least as long as the pattern.
    pub fn is_match(&self, attribute: &Attribute) -> MatchType {
        if attribute.variable_name() != self.variable {
            return MatchType::NoMatch;
        }
        let concrete = attribute.qualifier_path();
        let matched = self
            .qualifier_path
            .iter()
            .zip(concrete)
            .all(|(pattern, qualifier)| pattern.is_match(qualifier));
        if !matched {
            MatchType::NoMatch
        } else if self.qualifier_path.len() <= concrete.len() {
            MatchType::FullMatch
        } else {
            MatchType::PartialMatch
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_variable_pattern_covers_everything_below() {
        let pattern = AttributePattern::new("a", vec![]);
        let attr = Attribute::variable("a").step("anything").step(7i64);
        assert_eq!(pattern.is_match(&attr), MatchType::FullMatch);
        assert_eq!(pattern.is_match(&Attribute::variable("a")), MatchType::FullMatch);
    }

    #[test]
    fn longer_pattern_is_partial() {
        let pattern = AttributePattern::new("a", vec![AttributeQualifierPattern::of(0i64)]);
        assert_eq!(pattern.is_match(&Attribute::variable("a")), MatchType::PartialMatch);
    }

    #[test]
    fn different_variable_never_matches() {
        let pattern = AttributePattern::new("a", vec![]);
        assert_eq!(pattern.is_match(&Attribute::variable("b")), MatchType::NoMatch);
        let pattern = AttributePattern::new("a", vec![AttributeQualifierPattern::wildcard()]);
        assert_eq!(
            pattern.is_match(&Attribute::variable("b").step(1i64)),
            MatchType::NoMatch
        );
    }

    #[test]
    fn wildcards_and_mismatches() {
        let pattern = AttributePattern::new(
            "req",
            vec![
                AttributeQualifierPattern::of("headers"),
                AttributeQualifierPattern::wildcard(),
            ],
        );
        let hit = Attribute::variable("req").step("headers").step("x-id");
        let miss = Attribute::variable("req").step("body").step("x-id");
        assert_eq!(pattern.is_match(&hit), MatchType::FullMatch);
        assert_eq!(pattern.is_match(&miss), MatchType::NoMatch);
        // A mismatch in the shared prefix wins over length.
        let short_miss = Attribute::variable("req").step("body");
        assert_eq!(pattern.is_match(&short_miss), MatchType::NoMatch);
    }

    #[test]
    fn int_and_uint_segments_differ() {
        let pattern = AttributePattern::new("m", vec![AttributeQualifierPattern::of(1i64)]);
        assert_eq!(
            pattern.is_match(&Attribute::variable("m").step(1u64)),
            MatchType::NoMatch
        );
    }

    #[test]
    fn matches_runtime_values() {
        let p = AttributeQualifierPattern::of("k");
        assert!(p.matches_value(&Value::from("k")));
        assert!(!p.matches_value(&Value::Int(1)));
        assert!(AttributeQualifierPattern::wildcard().matches_value(&Value::Double(1.0)));
        assert!(!AttributeQualifierPattern::of(1i64).matches_value(&Value::Double(1.0)));
    }

    #[test]
    fn loads_from_json() {
        let pattern: AttributePattern = serde_json::from_value(serde_json::json!({
            "variable": "req",
            "qualifier_path": [{ "string": "headers" }, null]
        }))
        .unwrap();
        assert_eq!(pattern.qualifier_path().len(), 2);
        assert!(pattern.qualifier_path()[1].is_wildcard());
    }
}

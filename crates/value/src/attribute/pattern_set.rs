use serde::{Deserialize, Serialize};

use super::path::Attribute;
use super::pattern::{AttributePattern, MatchType};
use crate::error::RuntimeError;
use crate::unknown::UnknownSet;
use crate::value::Value;

/// Attribute patterns a caller has declared unknown or missing for one
/// evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSet {
    pub unknown_patterns: Vec<AttributePattern>,
    pub missing_patterns: Vec<AttributePattern>,
}

impl PatternSet {
    pub fn new(unknown_patterns: Vec<AttributePattern>, missing_patterns: Vec<AttributePattern>) -> Self {
        PatternSet {
            unknown_patterns,
            missing_patterns,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.unknown_patterns.is_empty() && self.missing_patterns.is_empty()
    }

    /// Whether `attribute` falls under a declared unknown. With `partial`
    /// set, an attribute that is a prefix of a pattern also counts.
    pub fn check_for_unknown(&self, attribute: &Attribute, partial: bool) -> bool {
        self.unknown_patterns.iter().any(|pattern| match pattern.is_match(attribute) {
            MatchType::FullMatch => true,
            MatchType::PartialMatch => partial,
            MatchType::NoMatch => false,
        })
    }

    /// A `MissingAttribute` error value when `attribute` falls under a
    /// declared missing pattern.
    pub fn check_for_missing(&self, attribute: &Attribute) -> Option<Value> {
        let hit = self
            .missing_patterns
            .iter()
            .any(|pattern| pattern.is_match(attribute) == MatchType::FullMatch);
        if !hit {
            return None;
        }
        tracing::debug!(attribute = %attribute, "attribute declared missing");
        Some(Value::error(RuntimeError::MissingAttribute {
            attribute: attribute.to_string(),
        }))
    }

    /// An unknown value for `attribute` when it falls under a declared
    /// unknown pattern.
    pub fn unknown_for(&self, attribute: &Attribute, partial: bool) -> Option<Value> {
        if self.check_for_unknown(attribute, partial) {
            Some(Value::Unknown(UnknownSet::from_attribute(attribute.clone())))
        } else {
            None
        }
    }
}

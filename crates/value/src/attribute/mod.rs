//! Attribute paths and attribute patterns.
//!
//! An [`Attribute`] names a concrete select chain (`req.headers["k"]`)
//! independent of any record. An [`AttributePattern`] is a wildcarded
//! template over such chains; a [`PatternSet`] groups the patterns a
//! caller declared unknown or missing, and is consulted without touching
//! any record.

mod path;
mod pattern;
mod pattern_set;
mod qualifier;

pub use path::Attribute;
pub use pattern::{AttributePattern, AttributeQualifierPattern, MatchType};
pub use pattern_set::PatternSet;
pub use qualifier::AttributeQualifier;

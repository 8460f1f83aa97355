//! quill-qualify: incremental select-chain resolution.
//!
//! Given a root [`RecordRef`](quill_reflect::RecordRef) and an ordered list
//! of [`SelectQualifier`]s (static field specifiers and runtime keys),
//! [`QualifyEngine`] walks the chain and returns the selected value or a
//! presence bit, together with how many qualifiers were consumed.
//!
//! Failures are returned as `Value::Error` with no consumed count; they
//! never panic.

pub mod engine;
pub mod qualifier;

pub use engine::{QualifyEngine, QualifyOptions};
pub use qualifier::{FieldSpecifier, QualifyResult, SelectQualifier};

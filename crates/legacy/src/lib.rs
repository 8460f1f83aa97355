//! quill-legacy: bridge to the legacy value representation.
//!
//! [`to_legacy`] and [`from_legacy`] cover every runtime kind. Records
//! and containers cross without copying where both sides can share the
//! body. [`legacy_equal`] and [`cross_equal`] apply heterogeneous
//! equality within the legacy model and across the two models.

pub mod convert;
pub mod equality;
pub mod value;

pub use convert::{from_legacy, to_legacy};
pub use equality::{cross_equal, legacy_equal};
pub use value::{LegacyList, LegacyMap, LegacyStatus, LegacyValue, SpecialMarker};

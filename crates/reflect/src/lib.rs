//! quill-reflect: schema descriptors and reflective records.
//!
//! Records are described by a [`MessageDescriptor`] (named, numbered,
//! typed fields; repeated and map fields) and accessed through the
//! [`Record`] trait, so the value runtime and the qualify engine can walk
//! any record without compile-time knowledge of its schema.
//!
//! [`DynamicRecord`] is the in-tree implementation, built field by field
//! or loaded from JSON against a [`DescriptorPool`].

pub mod descriptor;
pub mod dynamic;
pub mod error;
pub mod pool;
pub mod record;
pub mod well_known;

pub use descriptor::{Cardinality, FieldDescriptor, FieldKind, MapKeyType, MessageDescriptor};
pub use dynamic::DynamicRecord;
pub use error::SchemaError;
pub use pool::DescriptorPool;
pub use record::{records_equal, FieldValue, MapKey, Record, RecordRef, ScalarValue};
pub use well_known::WellKnownType;

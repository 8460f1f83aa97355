//! quill-value: the runtime value model.
//!
//! [`Value`] is a closed tagged union over every runtime kind. String,
//! bytes, list and map bodies sit behind a [`CowBox`], so cloning a value
//! is always a reference bump. Lists and maps are immutable; changed
//! containers are produced through the move-only [`ListBuilder`] and
//! [`MapBuilder`].
//!
//! Runtime failures are values too: [`Value::Error`] carries a
//! [`RuntimeError`] so one failed access can sit inside a larger result.
//!
//! The [`attribute`] module describes select chains (`a.b[3]["k"]`) and
//! wildcarded patterns over them, independent of any concrete record.

pub mod attribute;
pub mod convert;
pub mod cow;
pub mod equality;
pub mod error;
pub mod json;
pub mod kind;
pub mod list;
pub mod map;
pub mod strings;
pub mod structs;
pub mod unknown;
pub mod value;

pub use attribute::{
    Attribute, AttributePattern, AttributeQualifier, AttributeQualifierPattern, MatchType, PatternSet,
};
pub use convert::{field_to_value, record_to_value, scalar_to_value, ConvertOptions};
pub use cow::CowBox;
pub use equality::{heterogeneous_compare, heterogeneous_equal};
pub use error::{ErrorValue, RuntimeError, StatusCode};
pub use kind::Kind;
pub use list::{ListBuilder, ListValue};
pub use map::{Key, MapBuilder, MapValue};
pub use strings::{BytesValue, StringValue};
pub use structs::{CustomStruct, StructValue};
pub use unknown::UnknownSet;
pub use value::{TypeValue, Value};

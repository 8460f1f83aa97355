//! The qualify state machine.
//!
//! Qualifiers are applied one at a time starting from a root record:
//!
//! - `Message`: a field specifier selects a field. Plain nested records
//!   are stepped into; scalars, well-known types and the last qualifier's
//!   target resolve to a value. Repeated and map fields wait for an index
//!   or key in `PendingContainer`.
//! - `PendingContainer`: an attribute qualifier indexes the list or looks
//!   up the map key. Elements that are plain records are stepped into.
//! - `Resolved`: a value was reached; remaining qualifiers are left to the
//!   caller.
//!
//! Presence tests (`apply_and_has`) apply only to the last qualifier;
//! everything before it is resolved with get semantics.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use quill_reflect::{FieldDescriptor, MapKey, MapKeyType, Record, RecordRef, ScalarValue};
use quill_value::{
    field_to_value, record_to_value, scalar_to_value, AttributeQualifier, ConvertOptions, RuntimeError,
    Value,
};

use crate::qualifier::{FieldSpecifier, QualifyResult, SelectQualifier};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualifyOptions {
    pub convert: ConvertOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Get,
    Has,
}

enum State {
    Message(RecordRef),
    PendingContainer {
        record: RecordRef,
        field: FieldDescriptor,
    },
    Resolved(Value),
}

enum Step {
    Next(State),
    /// A presence test on the last qualifier answered early.
    Finished(Value),
}

/// Resolves select chains against reflective records. Holds no state
/// beyond its options; one engine can serve concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct QualifyEngine {
    options: QualifyOptions,
}

impl QualifyEngine {
    pub fn new(options: QualifyOptions) -> Self {
        QualifyEngine { options }
    }

    pub fn options(&self) -> &QualifyOptions {
        &self.options
    }

    /// Resolve `qualifiers` against `root` and return the selected value.
    pub fn apply_and_get(&self, root: &RecordRef, qualifiers: &[SelectQualifier]) -> QualifyResult {
        self.apply(root, qualifiers, Mode::Get)
    }

    /// Resolve every qualifier but the last, then test presence of the
    /// last one. The value is `Bool` on success.
    pub fn apply_and_has(&self, root: &RecordRef, qualifiers: &[SelectQualifier]) -> QualifyResult {
        self.apply(root, qualifiers, Mode::Has)
    }

    fn apply(&self, root: &RecordRef, qualifiers: &[SelectQualifier], mode: Mode) -> QualifyResult {
        if qualifiers.is_empty() {
            return QualifyResult::failed(RuntimeError::InvalidArgument(
                "qualifier list must not be empty".to_string(),
            ));
        }
        let last = qualifiers.len() - 1;
        let mut state = State::Message(Arc::clone(root));
        for (index, qualifier) in qualifiers.iter().enumerate() {
            if let State::Resolved(value) = state {
                tracing::trace!(consumed = index, "reached a value before the end of the chain");
                return QualifyResult::resolved(value, index);
            }
            tracing::trace!(index, qualifier = %qualifier, ?mode, "applying qualifier");
            state = match self.step(state, qualifier, index == last, mode) {
                Ok(Step::Next(next)) => next,
                Ok(Step::Finished(value)) => return QualifyResult::resolved(value, index + 1),
                Err(error) => {
                    tracing::debug!(index, qualifier = %qualifier, %error, "qualify failed");
                    return QualifyResult::failed(error);
                }
            };
        }
        match state {
            State::Resolved(value) => QualifyResult::resolved(value, qualifiers.len()),
            State::Message(record) => {
                QualifyResult::resolved(record_to_value(&record, &self.options.convert), qualifiers.len())
            }
            State::PendingContainer { field, .. } => QualifyResult::failed(RuntimeError::Internal(
                format!("select chain ended on container field {}", field.name),
            )),
        }
    }

    fn step(
        &self,
        state: State,
        qualifier: &SelectQualifier,
        is_last: bool,
        mode: Mode,
    ) -> Result<Step, RuntimeError> {
        match (state, qualifier) {
            (State::Message(record), SelectQualifier::Field(spec)) => {
                self.select_field(record, spec, is_last, mode)
            }
            (State::Message(record), SelectQualifier::Attribute(q)) => {
                Err(RuntimeError::Unimplemented(format!(
                    "dynamic access {} on message {}",
                    q,
                    record.descriptor().full_name()
                )))
            }
            (State::PendingContainer { field, .. }, SelectQualifier::Field(spec)) => {
                Err(RuntimeError::Unimplemented(format!(
                    "field access .{} on container field {}",
                    spec.name, field.name
                )))
            }
            (State::PendingContainer { record, field }, SelectQualifier::Attribute(q)) => {
                if field.is_map() {
                    self.select_map_entry(record.as_ref(), &field, q, is_last, mode)
                } else {
                    self.select_list_element(record.as_ref(), &field, q, is_last, mode)
                }
            }
            (State::Resolved(_), _) => Err(RuntimeError::Internal(
                "qualifier applied to a resolved value".to_string(),
            )),
        }
    }

    fn select_field(
        &self,
        record: RecordRef,
        spec: &FieldSpecifier,
        is_last: bool,
        mode: Mode,
    ) -> Result<Step, RuntimeError> {
        let desc = record.descriptor();
        let field = desc
            .find_field_by_number(spec.number)
            .or_else(|| desc.find_field_by_name(&spec.name))
            .ok_or_else(|| RuntimeError::no_such_field(desc.full_name(), &spec.name))?;

        if is_last {
            return Ok(match mode {
                Mode::Has => Step::Finished(Value::Bool(record.has_field(field))),
                Mode::Get => Step::Next(State::Resolved(self.field_value(record.as_ref(), field))),
            });
        }
        if field.is_container() {
            return Ok(Step::Next(State::PendingContainer {
                record: Arc::clone(&record),
                field: field.clone(),
            }));
        }
        if !is_traversable(field) {
            return Ok(Step::Next(State::Resolved(self.field_value(record.as_ref(), field))));
        }
        match record.singular(field) {
            Some(ScalarValue::Message(nested)) => Ok(Step::Next(State::Message(nested))),
            _ => Err(RuntimeError::Internal(format!(
                "message field {} of {} has no record",
                field.name,
                desc.full_name()
            ))),
        }
    }

    fn select_list_element(
        &self,
        record: &dyn Record,
        field: &FieldDescriptor,
        qualifier: &AttributeQualifier,
        is_last: bool,
        mode: Mode,
    ) -> Result<Step, RuntimeError> {
        let index = qualifier.as_int().ok_or_else(|| {
            RuntimeError::InvalidArgument(format!(
                "list index for {} must be int, got {}",
                field.name,
                qualifier.kind()
            ))
        })?;
        let items = record.repeated(field);
        let element = usize::try_from(index)
            .ok()
            .and_then(|i| items.get(i))
            .ok_or(RuntimeError::IndexOutOfRange {
                index,
                size: items.len(),
            })?;
        if is_last && mode == Mode::Has {
            return Err(RuntimeError::Unimplemented(format!(
                "presence test on element of list field {}",
                field.name
            )));
        }
        Ok(self.element_step(element, is_last))
    }

    fn select_map_entry(
        &self,
        record: &dyn Record,
        field: &FieldDescriptor,
        qualifier: &AttributeQualifier,
        is_last: bool,
        mode: Mode,
    ) -> Result<Step, RuntimeError> {
        let key_type = field.map_key_type().ok_or_else(|| {
            RuntimeError::Internal(format!("field {} is not a map", field.name))
        })?;
        let key = map_key_for(qualifier, key_type)?;
        let found = record.map_entries(field).and_then(|entries| entries.get(&key));
        if is_last && mode == Mode::Has {
            return Ok(Step::Finished(Value::Bool(found.is_some())));
        }
        let element = found.ok_or_else(|| RuntimeError::NoSuchKey { key: key.to_string() })?;
        Ok(self.element_step(element, is_last))
    }

    fn element_step(&self, element: &ScalarValue, is_last: bool) -> Step {
        match element {
            ScalarValue::Message(nested) if !is_last && nested.descriptor().well_known().is_none() => {
                Step::Next(State::Message(Arc::clone(nested)))
            }
            other => Step::Next(State::Resolved(scalar_to_value(other, &self.options.convert))),
        }
    }

    fn field_value(&self, record: &dyn Record, field: &FieldDescriptor) -> Value {
        field_to_value(record, field, &self.options.convert)
    }
}

/// Singular message fields of ordinary types can be stepped into.
/// Well-known types are read whole.
fn is_traversable(field: &FieldDescriptor) -> bool {
    match field.kind.message_type() {
        Some(type_name) => quill_reflect::WellKnownType::from_full_name(type_name)
            .map_or(true, |wkt| wkt.is_traversable()),
        None => false,
    }
}

/// Convert a runtime key to the map's declared key type. Integer keys are
/// range checked against narrower key types rather than truncated.
fn map_key_for(qualifier: &AttributeQualifier, key_type: MapKeyType) -> Result<MapKey, RuntimeError> {
    let out_of_range = |key: String| RuntimeError::KeyOutOfRange {
        key,
        key_type: key_type.name().to_string(),
    };
    match (key_type, qualifier) {
        (MapKeyType::Bool, AttributeQualifier::Bool(b)) => Ok(MapKey::Bool(*b)),
        (MapKeyType::Int64, AttributeQualifier::Int(i)) => Ok(MapKey::Int64(*i)),
        (MapKeyType::Int32, AttributeQualifier::Int(i)) => i32::try_from(*i)
            .map(MapKey::Int32)
            .map_err(|_| out_of_range(i.to_string())),
        (MapKeyType::Uint64, AttributeQualifier::Uint(u)) => Ok(MapKey::Uint64(*u)),
        (MapKeyType::Uint32, AttributeQualifier::Uint(u)) => u32::try_from(*u)
            .map(MapKey::Uint32)
            .map_err(|_| out_of_range(format!("{}u", u))),
        (MapKeyType::String, AttributeQualifier::String(s)) => Ok(MapKey::String(s.clone())),
        _ => Err(RuntimeError::InvalidMapKeyType {
            expected: key_type.name().to_string(),
            got: qualifier.kind().name().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_value::Kind;

    #[test]
    fn key_conversion_checks_kind_and_width() {
        assert_eq!(
            map_key_for(&AttributeQualifier::Int(7), MapKeyType::Int32).unwrap(),
            MapKey::Int32(7)
        );
        assert!(matches!(
            map_key_for(&AttributeQualifier::Int(i64::from(i32::MAX) + 1), MapKeyType::Int32),
            Err(RuntimeError::KeyOutOfRange { .. })
        ));
        assert!(matches!(
            map_key_for(&AttributeQualifier::Uint(u64::MAX), MapKeyType::Uint32),
            Err(RuntimeError::KeyOutOfRange { .. })
        ));
        assert!(matches!(
            map_key_for(&AttributeQualifier::Uint(1), MapKeyType::Int64),
            Err(RuntimeError::InvalidMapKeyType { .. })
        ));
        assert!(matches!(
            map_key_for(&AttributeQualifier::TypeKind(Kind::Double), MapKeyType::String),
            Err(RuntimeError::InvalidMapKeyType { .. })
        ));
        assert_eq!(
            map_key_for(&AttributeQualifier::Bool(true), MapKeyType::Bool).unwrap(),
            MapKey::Bool(true)
        );
    }
}

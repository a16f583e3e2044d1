//! Conversion between widget fields and the JSON state the host sees.
//!
//! Child references travel as `"IPY_MODEL_<id>"` strings; every other field
//! maps to the obvious JSON scalar.

use std::fmt;

use serde_json::Value;

use midicontrols_types::{FieldValue, Widget, WidgetId};

use crate::protocol::{ModuleInfo, WidgetState};

pub const MODEL_REF_PREFIX: &str = "IPY_MODEL_";

/// Host state that could not be turned into field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    BadReference { field: String, value: String },
    UnsupportedValue { field: String, found: &'static str },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadReference { field, value } => {
                write!(f, "field '{}': '{}' is not a widget reference", field, value)
            }
            Self::UnsupportedValue { field, found } => {
                write!(f, "field '{}': unsupported {} value", field, found)
            }
        }
    }
}

impl std::error::Error for StateError {}

pub fn encode_ref(id: WidgetId) -> String {
    format!("{}{}", MODEL_REF_PREFIX, id)
}

pub fn decode_ref(s: &str) -> Option<WidgetId> {
    s.strip_prefix(MODEL_REF_PREFIX)?.parse().ok().map(WidgetId::new)
}

pub fn field_to_json(value: &FieldValue) -> Value {
    match value {
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Int(n) => Value::from(*n),
        FieldValue::Str(s) => Value::String(s.clone()),
        FieldValue::Refs(ids) => {
            Value::Array(ids.iter().map(|&id| Value::String(encode_ref(id))).collect())
        }
    }
}

/// Read one host value. Whole-valued floats are accepted for integer fields;
/// the frontend's number inputs sometimes send `3.0`.
pub fn field_from_json(field: &str, value: &Value) -> Result<FieldValue, StateError> {
    let unsupported = |found| StateError::UnsupportedValue { field: field.to_string(), found };
    match value {
        Value::Bool(b) => Ok(FieldValue::Bool(*b)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(FieldValue::Int(i)),
            (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                Ok(FieldValue::Int(f as i64))
            }
            _ => Err(unsupported("non-integer number")),
        },
        Value::String(s) => Ok(FieldValue::Str(s.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let text = item.as_str().ok_or_else(|| unsupported("non-reference list"))?;
                decode_ref(text).ok_or_else(|| StateError::BadReference {
                    field: field.to_string(),
                    value: text.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::Refs),
        Value::Null => Err(unsupported("null")),
        Value::Object(_) => Err(unsupported("object")),
    }
}

/// Field updates carried by a host state, in key order. `Widget::apply_fields`
/// decides the order they are written in.
///
/// Keys starting with `_` are header keys and are skipped.
pub fn fields_from_state(state: &WidgetState) -> Result<Vec<(String, FieldValue)>, StateError> {
    state
        .iter()
        .filter(|(name, _)| !name.starts_with('_'))
        .map(|(name, value)| Ok((name.clone(), field_from_json(name, value)?)))
        .collect()
}

/// The `_model_*` / `_view_*` keys identifying how the host renders `widget`.
pub fn header(widget: &Widget, module: &ModuleInfo) -> WidgetState {
    let kind = widget.kind();
    let mut state = WidgetState::new();
    for (key, value) in [
        ("_model_name", kind.model_name()),
        ("_model_module", module.name.as_str()),
        ("_model_module_version", module.version.as_str()),
        ("_view_name", kind.view_name()),
        ("_view_module", module.name.as_str()),
        ("_view_module_version", module.version.as_str()),
    ] {
        state.insert(key.to_string(), Value::String(value.to_string()));
    }
    state
}

/// Header plus every field.
pub fn full_state(widget: &Widget, module: &ModuleInfo) -> WidgetState {
    let mut state = header(widget, module);
    for (name, value) in widget.fields() {
        state.insert(name.to_string(), field_to_json(&value));
    }
    state
}

//! Named field values exchanged with the rendering host.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::range::InvalidRangeError;
use crate::WidgetId;

/// A single synchronized field value.
///
/// Scalars and enum literals cover the controls; `Refs` carries the ordered
/// child collections of a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Str(String),
    Refs(Vec<WidgetId>),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Str(_) => "string",
            FieldValue::Refs(_) => "widget list",
        }
    }

    pub(crate) fn as_bool(&self, field: &str) -> Result<bool, FieldError> {
        match self {
            FieldValue::Bool(b) => Ok(*b),
            other => Err(FieldError::mismatch(field, "bool", other)),
        }
    }

    pub(crate) fn as_int(&self, field: &str) -> Result<i64, FieldError> {
        match self {
            FieldValue::Int(v) => Ok(*v),
            other => Err(FieldError::mismatch(field, "int", other)),
        }
    }

    pub(crate) fn as_str(&self, field: &str) -> Result<&str, FieldError> {
        match self {
            FieldValue::Str(s) => Ok(s),
            other => Err(FieldError::mismatch(field, "string", other)),
        }
    }

    pub(crate) fn as_refs(&self, field: &str) -> Result<&[WidgetId], FieldError> {
        match self {
            FieldValue::Refs(ids) => Ok(ids),
            other => Err(FieldError::mismatch(field, "widget list", other)),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

impl From<Vec<WidgetId>> for FieldValue {
    fn from(v: Vec<WidgetId>) -> Self {
        FieldValue::Refs(v)
    }
}

/// A rejected field write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    UnknownField { model: &'static str, field: String },
    TypeMismatch { field: String, expected: &'static str, found: &'static str },
    InvalidChoice(ParseChoiceError),
    Range(InvalidRangeError),
}

impl FieldError {
    fn mismatch(field: &str, expected: &'static str, found: &FieldValue) -> Self {
        FieldError::TypeMismatch {
            field: field.to_string(),
            expected,
            found: found.type_name(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::UnknownField { model, field } => {
                write!(f, "{} has no field '{}'", model, field)
            }
            FieldError::TypeMismatch { field, expected, found } => {
                write!(f, "field '{}' expects {}, got {}", field, expected, found)
            }
            FieldError::InvalidChoice(e) => write!(f, "{}", e),
            FieldError::Range(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for FieldError {}

impl From<InvalidRangeError> for FieldError {
    fn from(e: InvalidRangeError) -> Self {
        FieldError::Range(e)
    }
}

impl From<ParseChoiceError> for FieldError {
    fn from(e: ParseChoiceError) -> Self {
        FieldError::InvalidChoice(e)
    }
}

/// An enum literal that matched none of the allowed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChoiceError {
    pub value: String,
    pub allowed: &'static [&'static str],
}

impl fmt::Display for ParseChoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not one of {:?}", self.value, self.allowed)
    }
}

impl std::error::Error for ParseChoiceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_wire_form() {
        assert_eq!(serde_json::to_string(&FieldValue::Int(5)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&FieldValue::from("trim")).unwrap(), "\"trim\"");
        let v: FieldValue = serde_json::from_str("true").unwrap();
        assert_eq!(v, FieldValue::Bool(true));
        let v: FieldValue = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(v, FieldValue::Refs(vec![WidgetId::new(1), WidgetId::new(2)]));
    }

    #[test]
    fn mismatch_message() {
        let err = FieldValue::Bool(true).as_int("max").unwrap_err();
        assert_eq!(err.to_string(), "field 'max' expects int, got bool");
    }
}

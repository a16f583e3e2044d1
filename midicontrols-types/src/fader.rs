use serde::{Deserialize, Serialize};

use crate::field::{FieldError, FieldValue};
use crate::range::{BoundedRange, InvalidRangeError, RangeControl, RangeDefaults};

/// Faders span the full 7-bit MIDI range unless told otherwise.
pub const FADER_RANGE: RangeDefaults = RangeDefaults { value: 0, min: 0, max: 127 };

/// A linear fader holding a bounded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFader")]
pub struct Fader {
    #[serde(flatten)]
    range: BoundedRange,
}

#[derive(Deserialize)]
struct RawFader {
    value: Option<i64>,
    min: Option<i64>,
    max: Option<i64>,
}

impl TryFrom<RawFader> for Fader {
    type Error = InvalidRangeError;

    fn try_from(raw: RawFader) -> Result<Self, Self::Error> {
        Self::with_options(raw.value, raw.min, raw.max)
    }
}

impl Default for Fader {
    fn default() -> Self {
        Self {
            range: BoundedRange::with_defaults(FADER_RANGE, None, None, None)
                .unwrap_or_default(),
        }
    }
}

impl Fader {
    pub const FIELDS: &'static [&'static str] = &["value", "min", "max"];

    pub fn new(value: i64, min: i64, max: i64) -> Result<Self, InvalidRangeError> {
        Self::with_options(Some(value), Some(min), Some(max))
    }

    /// Like [`Fader::new`], with unset fields taken from [`FADER_RANGE`].
    pub fn with_options(
        value: Option<i64>,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<Self, InvalidRangeError> {
        Ok(Self { range: BoundedRange::with_defaults(FADER_RANGE, value, min, max)? })
    }

    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("value", FieldValue::Int(self.value())),
            ("min", FieldValue::Int(self.min())),
            ("max", FieldValue::Int(self.max())),
        ]
    }

    pub fn set_field(&mut self, name: &str, value: &FieldValue) -> Result<(), FieldError> {
        match name {
            "value" => self.set_value(value.as_int(name)?),
            "min" => self.set_min(value.as_int(name)?)?,
            "max" => self.set_max(value.as_int(name)?)?,
            _ => return Err(FieldError::UnknownField { model: "Fader", field: name.to_string() }),
        }
        Ok(())
    }
}

impl RangeControl for Fader {
    fn range(&self) -> &BoundedRange {
        &self.range
    }

    fn range_mut(&mut self) -> &mut BoundedRange {
        &mut self.range
    }
}

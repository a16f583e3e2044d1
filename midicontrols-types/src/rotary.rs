use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::field::{FieldError, FieldValue, ParseChoiceError};
use crate::range::{BoundedRange, InvalidRangeError, RangeControl, DEFAULT_RANGE};

/// How the LED ring around an encoder shows its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LightMode {
    /// One LED at the current position.
    #[default]
    Single,
    /// From the current position to the top.
    Trim,
    /// From the left edge up to the current position.
    Wrap,
    /// From the top down both sides.
    Spread,
}

impl LightMode {
    pub const ALL: [LightMode; 4] =
        [LightMode::Single, LightMode::Trim, LightMode::Wrap, LightMode::Spread];
    const NAMES: &'static [&'static str] = &["single", "trim", "wrap", "spread"];

    pub fn as_str(self) -> &'static str {
        match self {
            LightMode::Single => "single",
            LightMode::Trim => "trim",
            LightMode::Wrap => "wrap",
            LightMode::Spread => "spread",
        }
    }
}

impl fmt::Display for LightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LightMode {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LightMode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseChoiceError { value: s.to_string(), allowed: Self::NAMES })
    }
}

impl TryFrom<String> for LightMode {
    type Error = ParseChoiceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// An endless encoder with an LED ring, holding a bounded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawRotary")]
pub struct Rotary {
    #[serde(flatten)]
    range: BoundedRange,
    pub light_mode: LightMode,
}

#[derive(Deserialize)]
struct RawRotary {
    value: Option<i64>,
    min: Option<i64>,
    max: Option<i64>,
    #[serde(default)]
    light_mode: LightMode,
}

impl TryFrom<RawRotary> for Rotary {
    type Error = InvalidRangeError;

    fn try_from(raw: RawRotary) -> Result<Self, Self::Error> {
        let range = BoundedRange::with_defaults(DEFAULT_RANGE, raw.value, raw.min, raw.max)?;
        Ok(Self { range, light_mode: raw.light_mode })
    }
}

impl Rotary {
    pub const FIELDS: &'static [&'static str] = &["value", "min", "max", "light_mode"];

    /// Build an encoder; `value` is clamped like [`BoundedRange::set_value`].
    pub fn new(value: i64, min: i64, max: i64) -> Result<Self, InvalidRangeError> {
        Ok(Self { range: BoundedRange::new(value, min, max)?, light_mode: LightMode::default() })
    }

    pub fn with_light_mode(mut self, light_mode: LightMode) -> Self {
        self.light_mode = light_mode;
        self
    }

    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("value", FieldValue::Int(self.value())),
            ("min", FieldValue::Int(self.min())),
            ("max", FieldValue::Int(self.max())),
            ("light_mode", FieldValue::from(self.light_mode.as_str())),
        ]
    }

    pub fn set_field(&mut self, name: &str, value: &FieldValue) -> Result<(), FieldError> {
        match name {
            "value" => self.set_value(value.as_int(name)?),
            "min" => self.set_min(value.as_int(name)?)?,
            "max" => self.set_max(value.as_int(name)?)?,
            "light_mode" => self.light_mode = value.as_str(name)?.parse()?,
            _ => {
                return Err(FieldError::UnknownField { model: "Rotary", field: name.to_string() })
            }
        }
        Ok(())
    }
}

impl RangeControl for Rotary {
    fn range(&self) -> &BoundedRange {
        &self.range
    }

    fn range_mut(&mut self) -> &mut BoundedRange {
        &mut self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_clamps() {
        let r = Rotary::new(200, 0, 100).unwrap();
        assert_eq!(r.value(), 100);
        assert_eq!(r.light_mode, LightMode::Single);
    }

    #[test]
    fn default_range() {
        let r = Rotary::default();
        assert_eq!((r.value(), r.min(), r.max()), (0, 0, 100));
    }

    #[test]
    fn cascading_bounds_through_fields() {
        let mut r = Rotary::new(80, 0, 100).unwrap();
        r.set_field("max", &FieldValue::Int(60)).unwrap();
        assert_eq!(r.value(), 60);
        let err = r.set_field("min", &FieldValue::Int(61)).unwrap_err();
        assert!(matches!(err, FieldError::Range(_)));
        assert_eq!((r.value(), r.min(), r.max()), (60, 0, 60));
    }

    #[test]
    fn light_mode_field() {
        let mut r = Rotary::default();
        r.set_field("light_mode", &FieldValue::from("SPREAD")).unwrap();
        assert_eq!(r.light_mode, LightMode::Spread);
        assert!(r.set_field("light_mode", &FieldValue::from("fan")).is_err());
    }

    #[test]
    fn flat_serde_shape() {
        let r = Rotary::new(5, 0, 10).unwrap().with_light_mode(LightMode::Wrap);
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"value": 5, "min": 0, "max": 10, "light_mode": "wrap"})
        );
        let back: Rotary = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);

        let clamped: Rotary = serde_json::from_str(r#"{"value": 200}"#).unwrap();
        assert_eq!(clamped.value(), 100);
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::field::{FieldError, FieldValue, ParseChoiceError};

/// How a button's value follows the physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ButtonMode {
    /// True only while the key is held down.
    #[default]
    Momentary,
    /// Each full click flips the value.
    Toggle,
}

impl ButtonMode {
    pub const ALL: [ButtonMode; 2] = [ButtonMode::Momentary, ButtonMode::Toggle];
    const NAMES: &'static [&'static str] = &["momentary", "toggle"];

    pub fn as_str(self) -> &'static str {
        match self {
            ButtonMode::Momentary => "momentary",
            ButtonMode::Toggle => "toggle",
        }
    }
}

impl fmt::Display for ButtonMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ButtonMode {
    type Err = ParseChoiceError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ButtonMode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseChoiceError { value: s.to_string(), allowed: Self::NAMES })
    }
}

impl TryFrom<String> for ButtonMode {
    type Error = ParseChoiceError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A two-state key on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Button {
    pub value: bool,
    pub mode: ButtonMode,
}

impl Button {
    pub const FIELDS: &'static [&'static str] = &["value", "mode"];

    pub fn new(mode: ButtonMode) -> Self {
        Self { value: false, mode }
    }

    /// Key went down. Only momentary buttons react.
    pub fn press(&mut self) {
        if self.mode == ButtonMode::Momentary {
            self.value = !self.value;
        }
    }

    /// Key came up. Flips the value in either mode; every release is a click.
    pub fn release(&mut self) {
        self.value = !self.value;
    }

    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("value", FieldValue::Bool(self.value)),
            ("mode", FieldValue::from(self.mode.as_str())),
        ]
    }

    pub fn set_field(&mut self, name: &str, value: &FieldValue) -> Result<(), FieldError> {
        match name {
            "value" => self.value = value.as_bool(name)?,
            "mode" => self.mode = value.as_str(name)?.parse()?,
            _ => {
                return Err(FieldError::UnknownField { model: "Button", field: name.to_string() })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("TOGGLE".parse::<ButtonMode>().unwrap(), ButtonMode::Toggle);
        assert_eq!("Momentary".parse::<ButtonMode>().unwrap(), ButtonMode::Momentary);
        let err = "latch".parse::<ButtonMode>().unwrap_err();
        assert_eq!(err.allowed, &["momentary", "toggle"]);
    }

    #[test]
    fn momentary_button_follows_the_key() {
        let mut b = Button::default();
        b.press();
        assert!(b.value);
        b.release();
        assert!(!b.value);
    }

    #[test]
    fn toggle_button_flips_per_click() {
        let mut b = Button::new(ButtonMode::Toggle);
        b.press();
        assert!(!b.value);
        b.release();
        assert!(b.value);
        b.press();
        b.release();
        assert!(!b.value);
    }

    #[test]
    fn field_writes() {
        let mut b = Button::default();
        b.set_field("mode", &FieldValue::from("Toggle")).unwrap();
        b.set_field("value", &FieldValue::Bool(true)).unwrap();
        assert_eq!(b, Button { value: true, mode: ButtonMode::Toggle });

        assert!(matches!(
            b.set_field("mode", &FieldValue::from("sticky")),
            Err(FieldError::InvalidChoice(_))
        ));
        assert!(matches!(
            b.set_field("light", &FieldValue::Bool(true)),
            Err(FieldError::UnknownField { .. })
        ));
    }

    #[test]
    fn serde_shape() {
        let json = serde_json::to_value(Button::new(ButtonMode::Toggle)).unwrap();
        assert_eq!(json, serde_json::json!({"value": false, "mode": "toggle"}));
        let b: Button = serde_json::from_str(r#"{"mode": "TOGGLE"}"#).unwrap();
        assert_eq!(b.mode, ButtonMode::Toggle);
    }
}

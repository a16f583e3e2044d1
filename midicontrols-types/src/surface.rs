//! The aggregate widget for one physical controller.

use serde::{Deserialize, Serialize};

use crate::field::{FieldError, FieldValue};
use crate::widget::{Handle, Model, WidgetKind};
use crate::{Button, Fader, Rotary, WidgetId};

/// Ordered groups of controls, laid out by physical position.
///
/// Groups hold references, so one control may appear in more than one group.
/// A group is never edited in place; replace it wholesale with the matching
/// setter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSurface {
    /// Main area, top row left to right, then bottom row left to right.
    buttons: Box<[Handle<Button>]>,
    /// Right side, top to bottom.
    side_buttons: Box<[Handle<Button>]>,
    /// Encoder push buttons, left to right.
    rotary_buttons: Box<[Handle<Button>]>,
    /// Encoders, left to right.
    rotary_encoders: Box<[Handle<Rotary>]>,
    faders: Box<[Handle<Fader>]>,
}

impl ControlSurface {
    pub const FIELDS: &'static [&'static str] =
        &["buttons", "side_buttons", "rotary_buttons", "rotary_encoders", "faders"];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn buttons(&self) -> &[Handle<Button>] {
        &self.buttons
    }

    pub fn side_buttons(&self) -> &[Handle<Button>] {
        &self.side_buttons
    }

    pub fn rotary_buttons(&self) -> &[Handle<Button>] {
        &self.rotary_buttons
    }

    pub fn rotary_encoders(&self) -> &[Handle<Rotary>] {
        &self.rotary_encoders
    }

    pub fn faders(&self) -> &[Handle<Fader>] {
        &self.faders
    }

    pub fn set_buttons(&mut self, buttons: impl Into<Box<[Handle<Button>]>>) {
        self.buttons = buttons.into();
    }

    pub fn set_side_buttons(&mut self, buttons: impl Into<Box<[Handle<Button>]>>) {
        self.side_buttons = buttons.into();
    }

    pub fn set_rotary_buttons(&mut self, buttons: impl Into<Box<[Handle<Button>]>>) {
        self.rotary_buttons = buttons.into();
    }

    pub fn set_rotary_encoders(&mut self, encoders: impl Into<Box<[Handle<Rotary>]>>) {
        self.rotary_encoders = encoders.into();
    }

    pub fn set_faders(&mut self, faders: impl Into<Box<[Handle<Fader>]>>) {
        self.faders = faders.into();
    }

    /// Model kind every member of a group must have.
    pub fn group_kind(field: &str) -> Option<WidgetKind> {
        match field {
            "buttons" | "side_buttons" | "rotary_buttons" => Some(Button::KIND),
            "rotary_encoders" => Some(Rotary::KIND),
            "faders" => Some(Fader::KIND),
            _ => None,
        }
    }

    /// Every referenced widget, in group order. Shared members repeat.
    pub fn children(&self) -> impl Iterator<Item = WidgetId> + '_ {
        let buttons = self.buttons.iter().chain(self.side_buttons.iter());
        buttons
            .chain(self.rotary_buttons.iter())
            .map(|h| h.id())
            .chain(self.rotary_encoders.iter().map(|h| h.id()))
            .chain(self.faders.iter().map(|h| h.id()))
    }

    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        fn ids<T>(group: &[Handle<T>]) -> FieldValue {
            FieldValue::Refs(group.iter().map(|h| h.id()).collect())
        }
        vec![
            ("buttons", ids(&self.buttons)),
            ("side_buttons", ids(&self.side_buttons)),
            ("rotary_buttons", ids(&self.rotary_buttons)),
            ("rotary_encoders", ids(&self.rotary_encoders)),
            ("faders", ids(&self.faders)),
        ]
    }

    /// Replace a group from raw ids. Kinds are not checked here.
    pub fn set_field(&mut self, name: &str, value: &FieldValue) -> Result<(), FieldError> {
        fn handles<T>(ids: &[WidgetId]) -> Box<[Handle<T>]> {
            ids.iter().copied().map(Handle::from_id).collect()
        }
        let ids = match Self::group_kind(name) {
            Some(_) => value.as_refs(name)?,
            None => {
                return Err(FieldError::UnknownField {
                    model: "ControlSurface",
                    field: name.to_string(),
                })
            }
        };
        match name {
            "buttons" => self.buttons = handles(ids),
            "side_buttons" => self.side_buttons = handles(ids),
            "rotary_buttons" => self.rotary_buttons = handles(ids),
            "rotary_encoders" => self.rotary_encoders = handles(ids),
            _ => self.faders = handles(ids),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(id: u32) -> Handle<Button> {
        Handle::from_id(WidgetId::new(id))
    }

    #[test]
    fn groups_replace_wholesale() {
        let mut s = ControlSurface::new();
        s.set_buttons(vec![button(1), button(2)]);
        s.set_side_buttons(vec![button(2)]);
        assert_eq!(s.buttons(), &[button(1), button(2)]);
        s.set_buttons(Vec::new());
        assert!(s.buttons().is_empty());
        assert_eq!(s.side_buttons(), &[button(2)]);
    }

    #[test]
    fn shared_members_listed_per_group() {
        let mut s = ControlSurface::new();
        s.set_buttons(vec![button(1)]);
        s.set_rotary_buttons(vec![button(1)]);
        s.set_faders(vec![Handle::from_id(WidgetId::new(9))]);
        let ids: Vec<u32> = s.children().map(|id| id.get()).collect();
        assert_eq!(ids, vec![1, 1, 9]);
    }

    #[test]
    fn field_roundtrip() {
        let mut s = ControlSurface::new();
        let refs = FieldValue::Refs(vec![WidgetId::new(4), WidgetId::new(5)]);
        s.set_field("rotary_encoders", &refs).unwrap();
        let fields = s.fields();
        assert_eq!(fields[3], ("rotary_encoders", refs));
        assert!(matches!(
            s.set_field("faders", &FieldValue::Int(1)),
            Err(FieldError::TypeMismatch { .. })
        ));
        assert!(matches!(
            s.set_field("knobs", &FieldValue::Refs(vec![])),
            Err(FieldError::UnknownField { .. })
        ));
    }

    #[test]
    fn group_kinds() {
        assert_eq!(ControlSurface::group_kind("side_buttons"), Some(WidgetKind::Button));
        assert_eq!(ControlSurface::group_kind("faders"), Some(WidgetKind::Fader));
        assert_eq!(ControlSurface::group_kind("value"), None);
    }
}

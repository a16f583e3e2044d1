//! Closed set of widget models and typed references between them.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::field::{FieldError, FieldValue};
use crate::range::{BoundedRange, RangeControl};
use crate::{Button, ControlSurface, Fader, Rotary, WidgetId};

/// Which model a widget is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetKind {
    Button,
    Rotary,
    Fader,
    Surface,
}

impl WidgetKind {
    /// Model name registered with the rendering host.
    pub fn model_name(self) -> &'static str {
        match self {
            WidgetKind::Button => "ButtonModel",
            WidgetKind::Rotary => "RotaryModel",
            WidgetKind::Fader => "FaderModel",
            WidgetKind::Surface => "XTouchMiniModel",
        }
    }

    pub fn view_name(self) -> &'static str {
        match self {
            WidgetKind::Surface => "XTouchMiniView",
            _ => "ValueView",
        }
    }

    pub fn from_model_name(name: &str) -> Option<Self> {
        [WidgetKind::Button, WidgetKind::Rotary, WidgetKind::Fader, WidgetKind::Surface]
            .into_iter()
            .find(|k| k.model_name() == name)
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.model_name())
    }
}

/// A widget model that can live in a [`Widget`].
pub trait Model: Clone + Sized {
    const KIND: WidgetKind;

    fn into_widget(self) -> Widget;
    fn from_widget(widget: &Widget) -> Option<&Self>;
    fn from_widget_mut(widget: &mut Widget) -> Option<&mut Self>;
}

macro_rules! impl_model {
    ($ty:ident, $variant:ident) => {
        impl Model for $ty {
            const KIND: WidgetKind = WidgetKind::$variant;

            fn into_widget(self) -> Widget {
                Widget::$variant(self)
            }

            fn from_widget(widget: &Widget) -> Option<&Self> {
                match widget {
                    Widget::$variant(m) => Some(m),
                    _ => None,
                }
            }

            fn from_widget_mut(widget: &mut Widget) -> Option<&mut Self> {
                match widget {
                    Widget::$variant(m) => Some(m),
                    _ => None,
                }
            }
        }
    };
}

impl_model!(Button, Button);
impl_model!(Rotary, Rotary);
impl_model!(Fader, Fader);
impl_model!(ControlSurface, Surface);

/// Typed reference to a widget of model `T`, by identity.
///
/// The same handle may appear in several collections. Creating one from a raw
/// id does not check that the widget exists; the registry does that.
pub struct Handle<T> {
    id: WidgetId,
    _model: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub fn from_id(id: WidgetId) -> Self {
        Self { id, _model: PhantomData }
    }

    pub fn id(self) -> WidgetId {
        self.id
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state)
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.id)
    }
}

impl<T> Serialize for Handle<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.id.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Handle<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        WidgetId::deserialize(deserializer).map(Handle::from_id)
    }
}

/// Any widget model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Widget {
    Button(Button),
    Rotary(Rotary),
    Fader(Fader),
    Surface(ControlSurface),
}

impl Widget {
    pub fn kind(&self) -> WidgetKind {
        match self {
            Widget::Button(_) => WidgetKind::Button,
            Widget::Rotary(_) => WidgetKind::Rotary,
            Widget::Fader(_) => WidgetKind::Fader,
            Widget::Surface(_) => WidgetKind::Surface,
        }
    }

    /// Default-constructed widget of the given kind.
    pub fn default_of(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Button => Widget::Button(Button::default()),
            WidgetKind::Rotary => Widget::Rotary(Rotary::default()),
            WidgetKind::Fader => Widget::Fader(Fader::default()),
            WidgetKind::Surface => Widget::Surface(ControlSurface::default()),
        }
    }

    /// Every synchronized field, in declaration order.
    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        match self {
            Widget::Button(m) => m.fields(),
            Widget::Rotary(m) => m.fields(),
            Widget::Fader(m) => m.fields(),
            Widget::Surface(m) => m.fields(),
        }
    }

    pub fn field(&self, name: &str) -> Option<FieldValue> {
        self.fields().into_iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn set_field(&mut self, name: &str, value: &FieldValue) -> Result<(), FieldError> {
        match self {
            Widget::Button(m) => m.set_field(name, value),
            Widget::Rotary(m) => m.set_field(name, value),
            Widget::Fader(m) => m.set_field(name, value),
            Widget::Surface(m) => m.set_field(name, value),
        }
    }

    pub fn range(&self) -> Option<&BoundedRange> {
        match self {
            Widget::Rotary(m) => Some(m.range()),
            Widget::Fader(m) => Some(m.range()),
            _ => None,
        }
    }

    fn range_mut(&mut self) -> Option<&mut BoundedRange> {
        match self {
            Widget::Rotary(m) => Some(m.range_mut()),
            Widget::Fader(m) => Some(m.range_mut()),
            _ => None,
        }
    }

    /// Write several fields as one update.
    ///
    /// When `min` and `max` arrive together on a range widget they are
    /// installed with [`BoundedRange::set_bounds`]. Bounds go in before
    /// `value`, so a value inside the new window is kept as sent. Either every
    /// field is written or, on error, the widget is left untouched.
    pub fn apply_fields(&mut self, fields: &[(String, FieldValue)]) -> Result<(), FieldError> {
        let mut staged = self.clone();
        staged.apply_ordered(fields)?;
        *self = staged;
        Ok(())
    }

    fn apply_ordered(&mut self, fields: &[(String, FieldValue)]) -> Result<(), FieldError> {
        let lookup = |name: &str| fields.iter().rev().find(|(n, _)| n == name).map(|(_, v)| v);
        let mut skip_bounds = false;
        if let (Some(min), Some(max)) = (lookup("min"), lookup("max")) {
            if let Some(range) = self.range_mut() {
                range.set_bounds(min.as_int("min")?, max.as_int("max")?)?;
                skip_bounds = true;
            }
        }
        for (name, value) in fields {
            let is_bound = name == "min" || name == "max";
            if name == "value" || (skip_bounds && is_bound) {
                continue;
            }
            self.set_field(name, value)?;
        }
        if let Some(value) = lookup("value") {
            self.set_field("value", value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ButtonMode, LightMode};

    fn update(pairs: &[(&str, FieldValue)]) -> Vec<(String, FieldValue)> {
        pairs.iter().map(|(n, v)| (n.to_string(), v.clone())).collect()
    }

    #[test]
    fn model_names_roundtrip() {
        for kind in [WidgetKind::Button, WidgetKind::Rotary, WidgetKind::Fader, WidgetKind::Surface] {
            assert_eq!(WidgetKind::from_model_name(kind.model_name()), Some(kind));
        }
        assert_eq!(WidgetKind::from_model_name("SliderModel"), None);
    }

    #[test]
    fn disjoint_bounds_move_is_atomic() {
        let mut w = Rotary::new(5, 0, 10).unwrap().into_widget();
        w.apply_fields(&update(&[("min", FieldValue::Int(20)), ("max", FieldValue::Int(30))])).unwrap();
        assert_eq!(w.range().map(|r| (r.value(), r.min(), r.max())), Some((20, 20, 30)));
    }

    #[test]
    fn value_applies_after_bounds() {
        let mut w = Fader::default().into_widget();
        w.apply_fields(&update(&[("value", FieldValue::Int(150)), ("max", FieldValue::Int(200))])).unwrap();
        assert_eq!(w.range().map(|r| r.value()), Some(150));
    }

    #[test]
    fn failed_update_changes_nothing() {
        let mut w = Rotary::new(50, 0, 100).unwrap().into_widget();
        let before = w.clone();
        let err = w
            .apply_fields(&update(&[
                ("light_mode", "trim".into()),
                ("min", FieldValue::Int(10)),
                ("max", FieldValue::Int(5)),
            ]))
            .unwrap_err();
        assert!(matches!(err, FieldError::Range(_)));
        assert_eq!(w, before);

        let err = w
            .apply_fields(&update(&[("value", FieldValue::Int(3)), ("light_mode", "blink".into())]))
            .unwrap_err();
        assert!(matches!(err, FieldError::InvalidChoice(_)));
        assert_eq!(w, before);
    }

    #[test]
    fn button_fields() {
        let mut w = Button::default().into_widget();
        w.apply_fields(&update(&[("mode", "toggle".into()), ("value", true.into())])).unwrap();
        assert_eq!(w, Widget::Button(Button { value: true, mode: ButtonMode::Toggle }));
        assert_eq!(w.field("mode"), Some(FieldValue::from("toggle")));
    }

    #[test]
    fn typed_access() {
        let mut w = Rotary::default().into_widget();
        assert!(Button::from_widget(&w).is_none());
        if let Some(r) = Rotary::from_widget_mut(&mut w) {
            r.light_mode = LightMode::Wrap;
        }
        assert_eq!(Rotary::from_widget(&w).map(|r| r.light_mode), Some(LightMode::Wrap));
    }

    #[test]
    fn handle_serializes_as_id() {
        let h: Handle<Button> = Handle::from_id(WidgetId::new(7));
        assert_eq!(serde_json::to_string(&h).unwrap(), "7");
        let back: Handle<Button> = serde_json::from_str("7").unwrap();
        assert_eq!(back, h);
    }
}

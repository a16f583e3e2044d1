//! # midicontrols-types
//!
//! Widget models for a virtual control surface mirroring a MIDI controller:
//! buttons, rotary encoders and faders, plus the surface that groups them.
//! Rendering and device I/O belong to the host; this crate only holds state
//! and enforces its rules.

mod button;
mod change;
mod fader;
mod field;
mod range;
mod rotary;
mod surface;
mod widget;

pub use button::{Button, ButtonMode};
pub use change::ChangeEvent;
pub use fader::{Fader, FADER_RANGE};
pub use field::{FieldError, FieldValue, ParseChoiceError};
pub use range::{Bound, BoundedRange, InvalidRangeError, RangeControl, RangeDefaults, DEFAULT_RANGE};
pub use rotary::{LightMode, Rotary};
pub use surface::ControlSurface;
pub use widget::{Handle, Model, Widget, WidgetKind};

/// Identity of a widget, stable for its lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct WidgetId(u32);

impl WidgetId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Default layout of a Behringer X-Touch Mini in MCU mode.
//!
//! Builds every control, registers it, groups them into a
//! [`ControlSurface`] and records which MIDI address drives which widget.

use std::collections::HashMap;

use midicontrols_types::{
    Button, ButtonMode, ControlSurface, Fader, Handle, LightMode, Rotary, WidgetId,
};

use crate::config::Config;
use crate::registry::WidgetRegistry;

/// Main buttons, top row left to right, then bottom row left to right.
pub const BUTTON_NOTES: [u8; 16] = [
    0x59, 0x5a, 0x28, 0x29, 0x2a, 0x2b, 0x2c, 0x2d, //
    0x57, 0x58, 0x5b, 0x5c, 0x56, 0x5d, 0x5e, 0x5f,
];
/// The two side buttons, top then bottom.
pub const SIDE_BUTTON_NOTES: [u8; 2] = [0x54, 0x55];
/// Encoder push buttons, left to right.
pub const ROTARY_BUTTON_NOTES: [u8; 8] = [0x20, 0x21, 0x22, 0x23, 0x24, 0x25, 0x26, 0x27];
/// Encoder control change numbers, left to right.
pub const ROTARY_CONTROLS: [u8; 8] = [0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17];
/// The fader reports as pitch bend on this channel.
pub const FADER_CHANNEL: u8 = 9;

/// Light modes assigned to the encoders, repeating left to right.
const ENCODER_LIGHT_MODES: [LightMode; 4] =
    [LightMode::Single, LightMode::Spread, LightMode::Trim, LightMode::Wrap];

/// Where a control sits on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MidiAddr {
    Note(u8),
    Control(u8),
    PitchBend(u8),
}

/// Two-way map between MIDI addresses and widgets.
#[derive(Debug, Clone, Default)]
pub struct ControlMap {
    by_addr: HashMap<MidiAddr, WidgetId>,
    by_widget: HashMap<WidgetId, MidiAddr>,
}

impl ControlMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `addr` to `widget`, replacing any earlier binding of either side.
    pub fn bind(&mut self, addr: MidiAddr, widget: WidgetId) {
        if let Some(old) = self.by_addr.insert(addr, widget) {
            self.by_widget.remove(&old);
        }
        if let Some(old) = self.by_widget.insert(widget, addr) {
            if old != addr {
                self.by_addr.remove(&old);
            }
        }
    }

    pub fn widget(&self, addr: MidiAddr) -> Option<WidgetId> {
        self.by_addr.get(&addr).copied()
    }

    pub fn addr(&self, widget: WidgetId) -> Option<MidiAddr> {
        self.by_widget.get(&widget).copied()
    }

    pub fn len(&self) -> usize {
        self.by_addr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_addr.is_empty()
    }
}

/// Handles to everything [`XTouchMini::build`] registered.
#[derive(Debug, Clone)]
pub struct XTouchMini {
    pub surface: Handle<ControlSurface>,
    pub buttons: Vec<Handle<Button>>,
    pub side_buttons: Vec<Handle<Button>>,
    pub rotary_buttons: Vec<Handle<Button>>,
    pub rotary_encoders: Vec<Handle<Rotary>>,
    pub fader: Handle<Fader>,
    pub map: ControlMap,
}

impl XTouchMini {
    /// Register a full controller in `registry`, children first.
    pub fn build(registry: &mut WidgetRegistry, config: &Config) -> Self {
        let mut map = ControlMap::new();
        let mut bind_buttons = |registry: &mut WidgetRegistry, notes: &[u8], mode: ButtonMode| {
            notes
                .iter()
                .map(|&note| {
                    let handle = registry.insert(Button::new(mode));
                    map.bind(MidiAddr::Note(note), handle.id());
                    handle
                })
                .collect::<Vec<_>>()
        };

        let buttons = bind_buttons(registry, &BUTTON_NOTES, config.button_mode());
        let side_buttons = bind_buttons(registry, &SIDE_BUTTON_NOTES, ButtonMode::Momentary);
        let rotary_buttons = bind_buttons(registry, &ROTARY_BUTTON_NOTES, ButtonMode::Momentary);

        let (rmin, rmax) = config.rotary_range();
        let rotary_encoders: Vec<Handle<Rotary>> = ROTARY_CONTROLS
            .iter()
            .enumerate()
            .map(|(i, &cc)| {
                let rotary = Rotary::new(rmin, rmin, rmax)
                    .unwrap_or_default()
                    .with_light_mode(ENCODER_LIGHT_MODES[i % ENCODER_LIGHT_MODES.len()]);
                let handle = registry.insert(rotary);
                map.bind(MidiAddr::Control(cc), handle.id());
                handle
            })
            .collect();

        let (fmin, fmax) = config.fader_range();
        let fader = registry.insert(Fader::new(fmin, fmin, fmax).unwrap_or_default());
        map.bind(MidiAddr::PitchBend(FADER_CHANNEL), fader.id());

        let mut surface = ControlSurface::new();
        surface.set_buttons(buttons.clone());
        surface.set_side_buttons(side_buttons.clone());
        surface.set_rotary_buttons(rotary_buttons.clone());
        surface.set_rotary_encoders(rotary_encoders.clone());
        surface.set_faders(vec![fader]);
        let surface = registry.insert(surface);
        log::info!("built X-Touch Mini surface {} ({} controls)", surface.id(), map.len());

        Self { surface, buttons, side_buttons, rotary_buttons, rotary_encoders, fader, map }
    }

    /// The main grid as two rows of eight.
    pub fn button_rows(&self) -> (&[Handle<Button>], &[Handle<Button>]) {
        self.buttons.split_at(self.buttons.len() / 2)
    }
}

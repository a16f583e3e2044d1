//! Translation between controller messages and widget state.
//!
//! Everything here works on plain byte slices and the registry; opening ports
//! and moving bytes is the host's job. Channels are 1-based, as printed in the
//! device documentation.

use midicontrols_types::{
    Button, ChangeEvent, Fader, LightMode, RangeControl, Rotary, Widget, WidgetId,
};

use crate::registry::{RegistryError, WidgetRegistry};
use crate::xtouch::{ControlMap, MidiAddr};

/// Button LED states, sent as note-on velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ButtonLight {
    Off = 0x00,
    Blink = 0x01,
    On = 0x7f,
}

/// Incoming message from the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Only the 7 most significant bits are reported by the device.
    PitchBend { channel: u8, msb: u8 },
}

impl ControllerEvent {
    /// Decode one channel message. Returns `None` for anything else.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        let channel = (status & 0x0f) + 1;
        let data1 = *data.first()? & 0x7f;
        let data2 = data.get(1).map(|b| b & 0x7f);
        match status & 0xf0 {
            0x80 => Some(Self::NoteOff { channel, note: data1 }),
            0x90 => match data2? {
                0 => Some(Self::NoteOff { channel, note: data1 }),
                velocity => Some(Self::NoteOn { channel, note: data1, velocity }),
            },
            0xb0 => Some(Self::ControlChange { channel, controller: data1, value: data2? }),
            0xe0 => Some(Self::PitchBend { channel, msb: data2? }),
            _ => None,
        }
    }

    fn addr(&self) -> MidiAddr {
        match *self {
            Self::NoteOn { note, .. } | Self::NoteOff { note, .. } => MidiAddr::Note(note),
            Self::ControlChange { controller, .. } => MidiAddr::Control(controller),
            Self::PitchBend { channel, .. } => MidiAddr::PitchBend(channel),
        }
    }
}

/// Outgoing message that updates the controller's lights or motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// 14-bit bend, 0x2000 is center.
    PitchBend { channel: u8, value: u16 },
}

impl FeedbackMessage {
    pub fn to_bytes(self) -> [u8; 3] {
        let status = |kind: u8, channel: u8| kind | (channel.saturating_sub(1) & 0x0f);
        match self {
            Self::NoteOn { channel, note, velocity } => {
                [status(0x90, channel), note & 0x7f, velocity & 0x7f]
            }
            Self::ControlChange { channel, controller, value } => {
                [status(0xb0, channel), controller & 0x7f, value & 0x7f]
            }
            Self::PitchBend { channel, value } => {
                [status(0xe0, channel), (value & 0x7f) as u8, ((value >> 7) & 0x7f) as u8]
            }
        }
    }
}

/// Relative encoder step: bit 6 is the sign, bits 0-5 the magnitude.
pub fn decode_relative(raw: u8) -> i64 {
    let magnitude = i64::from(raw & 0x3f);
    if raw & 0x40 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

/// Scale a 7-bit fader position onto `[min, max]`.
pub fn fader_value(msb: u8, min: i64, max: i64) -> i64 {
    let span = i128::from(max) - i128::from(min);
    let scaled = span * i128::from(msb.min(127)) / 127 + i128::from(min);
    scaled as i64
}

/// Controller number and value that draw `rotary` on the LED ring of `cc`.
///
/// The ring has 11 LEDs (7 positions in spread mode); the value is the mode
/// offset plus a 1-based LED position. The ring controller is `cc + 0x20`,
/// kept within 7 bits.
pub fn led_ring(rotary: &Rotary, cc: u8) -> (u8, u8) {
    let factor = match rotary.light_mode {
        LightMode::Spread => 6.999999,
        _ => 10.999999,
    };
    let leds = (rotary.range().normalized() * factor).trunc() as u8 + 1;
    let offset = match rotary.light_mode {
        LightMode::Single => 0x00,
        LightMode::Trim => 0x10,
        LightMode::Wrap => 0x20,
        LightMode::Spread => 0x30,
    };
    (cc.wrapping_add(0x20) & 0x7f, offset + leds)
}

pub fn button_light(on: bool) -> ButtonLight {
    if on {
        ButtonLight::On
    } else {
        ButtonLight::Off
    }
}

/// Fader position in `[-1.0, 1.0]`, for motorized faders.
pub fn fader_position(fader: &Fader) -> f64 {
    fader.range().normalized() * 2.0 - 1.0
}

fn pitch_bend_value(position: f64) -> u16 {
    ((position.clamp(-1.0, 1.0) + 1.0) / 2.0 * 16383.0).round() as u16
}

/// Routes controller messages into the registry and computes light feedback.
#[derive(Debug, Clone)]
pub struct SurfaceDriver {
    map: ControlMap,
    channel: u8,
    motorized_fader: bool,
}

impl SurfaceDriver {
    pub fn new(map: ControlMap) -> Self {
        Self { map, channel: 1, motorized_fader: false }
    }

    /// Send fader position back as pitch bend.
    pub fn with_motorized_fader(mut self, motorized: bool) -> Self {
        self.motorized_fader = motorized;
        self
    }

    pub fn map(&self) -> &ControlMap {
        &self.map
    }

    /// Apply one controller message. Unmapped messages are ignored.
    pub fn handle(
        &self,
        registry: &mut WidgetRegistry,
        event: ControllerEvent,
    ) -> Result<Vec<ChangeEvent>, RegistryError> {
        let Some(id) = self.map.widget(event.addr()) else {
            log::debug!("unmapped controller event {:?}", event);
            return Ok(Vec::new());
        };
        let changes = match event {
            ControllerEvent::NoteOn { .. } => {
                let button = registry.handle::<Button>(id)?;
                registry.update(button, |b| b.press())?.changes
            }
            ControllerEvent::NoteOff { .. } => {
                let button = registry.handle::<Button>(id)?;
                registry.update(button, |b| b.release())?.changes
            }
            ControllerEvent::ControlChange { value, .. } => {
                let rotary = registry.handle::<Rotary>(id)?;
                let step = decode_relative(value);
                registry.update(rotary, |r| r.range_mut().nudge(step))?.changes
            }
            ControllerEvent::PitchBend { msb, .. } => {
                let fader = registry.handle::<Fader>(id)?;
                let updated = registry.update(fader, |f| {
                    let value = fader_value(msb, f.min(), f.max());
                    f.set_value(value)
                })?;
                updated.changes
            }
        };
        log::debug!("{:?} -> widget {}: {} change(s)", event, id, changes.len());
        Ok(changes)
    }

    /// Light or motor message reflecting `change`, if the widget has one.
    pub fn feedback(&self, registry: &WidgetRegistry, change: &ChangeEvent) -> Option<FeedbackMessage> {
        self.feedback_for(registry, change.widget)
    }

    /// Current light state of every mapped control.
    pub fn refresh(&self, registry: &WidgetRegistry) -> Vec<FeedbackMessage> {
        registry.ids().filter_map(|id| self.feedback_for(registry, id)).collect()
    }

    fn feedback_for(&self, registry: &WidgetRegistry, id: WidgetId) -> Option<FeedbackMessage> {
        let addr = self.map.addr(id)?;
        let widget = registry.widget(id)?;
        match (addr, widget) {
            (MidiAddr::Note(note), Widget::Button(b)) => Some(FeedbackMessage::NoteOn {
                channel: self.channel,
                note,
                velocity: button_light(b.value) as u8,
            }),
            (MidiAddr::Control(cc), Widget::Rotary(r)) => {
                let (controller, value) = led_ring(r, cc);
                Some(FeedbackMessage::ControlChange { channel: self.channel, controller, value })
            }
            (MidiAddr::PitchBend(channel), Widget::Fader(f)) if self.motorized_fader => {
                let value = pitch_bend_value(fader_position(f));
                Some(FeedbackMessage::PitchBend { channel, value })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_channel_messages() {
        assert_eq!(
            ControllerEvent::parse(&[0x90, 0x59, 0x7f]),
            Some(ControllerEvent::NoteOn { channel: 1, note: 0x59, velocity: 0x7f })
        );
        assert_eq!(
            ControllerEvent::parse(&[0x90, 0x59, 0x00]),
            Some(ControllerEvent::NoteOff { channel: 1, note: 0x59 })
        );
        assert_eq!(
            ControllerEvent::parse(&[0x80, 0x20, 0x40]),
            Some(ControllerEvent::NoteOff { channel: 1, note: 0x20 })
        );
        assert_eq!(
            ControllerEvent::parse(&[0xb0, 0x10, 0x41]),
            Some(ControllerEvent::ControlChange { channel: 1, controller: 0x10, value: 0x41 })
        );
        assert_eq!(
            ControllerEvent::parse(&[0xe8, 0x00, 0x40]),
            Some(ControllerEvent::PitchBend { channel: 9, msb: 0x40 })
        );
        assert_eq!(ControllerEvent::parse(&[0xf8]), None);
        assert_eq!(ControllerEvent::parse(&[0xb0, 0x10]), None);
        assert_eq!(ControllerEvent::parse(&[]), None);
    }

    #[test]
    fn relative_steps() {
        assert_eq!(decode_relative(0x01), 1);
        assert_eq!(decode_relative(0x05), 5);
        assert_eq!(decode_relative(0x41), -1);
        assert_eq!(decode_relative(0x7f), -63);
        assert_eq!(decode_relative(0x00), 0);
    }

    #[test]
    fn fader_scaling() {
        assert_eq!(fader_value(0, 0, 127), 0);
        assert_eq!(fader_value(127, 0, 127), 127);
        assert_eq!(fader_value(64, 0, 100), 50);
        assert_eq!(fader_value(127, -50, 50), 50);
        assert_eq!(fader_value(0, -50, 50), -50);
    }

    #[test]
    fn led_ring_positions() {
        let mut r = Rotary::new(0, 0, 100).unwrap();
        assert_eq!(led_ring(&r, 0x10), (0x30, 1));
        r.set_value(100);
        assert_eq!(led_ring(&r, 0x10), (0x30, 11));
        r.set_value(50);
        assert_eq!(led_ring(&r, 0x11), (0x31, 6));

        let r = r.with_light_mode(LightMode::Spread);
        assert_eq!(led_ring(&r, 0x10), (0x30, 0x30 + 4));
        let top = Rotary::new(100, 0, 100).unwrap().with_light_mode(LightMode::Spread);
        assert_eq!(led_ring(&top, 0x10).1, 0x30 + 7);
        let trim = Rotary::new(0, 0, 100).unwrap().with_light_mode(LightMode::Trim);
        assert_eq!(led_ring(&trim, 0x10).1, 0x11);
    }

    #[test]
    fn led_ring_controller_stays_seven_bit() {
        let r = Rotary::default();
        assert_eq!(led_ring(&r, 0x5f).0, 0x7f);
        assert_eq!(led_ring(&r, 0x60).0, 0x00);
        assert_eq!(led_ring(&r, 0xf0).0, 0x10);
    }

    #[test]
    fn full_width_ranges() {
        let mut r = Rotary::new(i64::MIN, i64::MIN, i64::MAX).unwrap();
        assert_eq!(led_ring(&r, 0x10), (0x30, 1));
        r.set_value(0);
        assert_eq!(led_ring(&r, 0x10), (0x30, 6));
        r.set_value(i64::MAX);
        assert_eq!(led_ring(&r, 0x10), (0x30, 11));

        let f = Fader::new(i64::MAX, i64::MIN, i64::MAX).unwrap();
        assert_eq!(fader_position(&f), 1.0);
        assert_eq!(pitch_bend_value(fader_position(&f)), 16383);
        let f = Fader::new(i64::MIN, i64::MIN, i64::MAX).unwrap();
        assert_eq!(fader_position(&f), -1.0);

        assert_eq!(fader_value(127, i64::MIN, i64::MAX), i64::MAX);
        assert_eq!(fader_value(0, i64::MIN, i64::MAX), i64::MIN);
    }

    #[test]
    fn feedback_bytes() {
        let msg = FeedbackMessage::NoteOn { channel: 1, note: 0x59, velocity: ButtonLight::On as u8 };
        assert_eq!(msg.to_bytes(), [0x90, 0x59, 0x7f]);
        let msg = FeedbackMessage::ControlChange { channel: 1, controller: 0x30, value: 0x16 };
        assert_eq!(msg.to_bytes(), [0xb0, 0x30, 0x16]);
        let msg = FeedbackMessage::PitchBend { channel: 9, value: 0x2000 };
        assert_eq!(msg.to_bytes(), [0xe8, 0x00, 0x40]);
    }

    #[test]
    fn fader_position_and_bend() {
        let f = Fader::new(0, 0, 127).unwrap();
        assert_eq!(fader_position(&f), -1.0);
        assert_eq!(pitch_bend_value(fader_position(&f)), 0);
        let f = Fader::new(127, 0, 127).unwrap();
        assert_eq!(pitch_bend_value(fader_position(&f)), 16383);
    }
}

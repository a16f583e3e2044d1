//! # midicontrols-core
//!
//! Live widget ownership and controller behavior on top of
//! `midicontrols-types`.
//!
//! ## Module Overview
//!
//! - [`registry`]: `WidgetRegistry`: owns widgets by id, diffs every mutation
//!   and calls the registered on-change observers
//! - [`config`]: TOML configuration (embedded defaults + user override)
//! - [`xtouch`]: X-Touch Mini layout factory and the MIDI address map
//! - [`group`]: radio selection across buttons
//! - [`mcu`]: controller message decoding, LED/motor feedback values and the
//!   `SurfaceDriver` that routes messages into the registry

pub mod config;
pub mod group;
pub mod mcu;
pub mod registry;
pub mod xtouch;

pub use config::Config;
pub use group::{ButtonGroup, GroupError};
pub use mcu::{ControllerEvent, FeedbackMessage, SurfaceDriver};
pub use registry::{ObserverId, RegistryError, Updated, WidgetRegistry};
pub use xtouch::{ControlMap, MidiAddr, XTouchMini};

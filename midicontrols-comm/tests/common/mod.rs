#![allow(dead_code)]
//! Shared setup for midicontrols-comm integration tests.

use serde_json::Value;

use midicontrols_comm::{CommSession, HostMessage, KernelMessage, WidgetState};
use midicontrols_core::{Config, WidgetRegistry, XTouchMini};
use midicontrols_types::WidgetId;

/// A session holding the default X-Touch Mini layout.
pub fn xtouch_session() -> (CommSession, XTouchMini) {
    let config = Config::from_toml_str("").expect("empty config");
    let mut registry = WidgetRegistry::new();
    let mini = XTouchMini::build(&mut registry, &config);
    (CommSession::new(registry, &config), mini)
}

pub fn state(v: Value) -> WidgetState {
    match v {
        Value::Object(m) => m,
        other => panic!("expected object, got {}", other),
    }
}

pub fn update(widget: WidgetId, v: Value) -> HostMessage {
    HostMessage::Update { widget, state: state(v) }
}

/// The state carried by a single `update` reply.
pub fn only_update(replies: &[KernelMessage]) -> &WidgetState {
    match replies {
        [KernelMessage::Update { state, .. }] => state,
        other => panic!("expected one update, got {:?}", other),
    }
}

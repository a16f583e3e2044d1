//! Message types exchanged with the rendering host.
//!
//! Only the message shapes are defined here; carrying them (comm channel,
//! socket, pipe) is up to the host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use midicontrols_types::WidgetId;

/// Flat name/value state of one widget, including the `_model_*` and
/// `_view_*` header keys when sent in full.
pub type WidgetState = Map<String, Value>;

/// Messages sent from the host to the model side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum HostMessage {
    /// The user changed one or more fields in the frontend.
    Update { widget: WidgetId, state: WidgetState },
    /// The frontend wants the full current state.
    RequestState { widget: WidgetId },
    /// The frontend dropped its view of the widget.
    Close { widget: WidgetId },
}

/// Messages sent from the model side to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum KernelMessage {
    /// A widget exists; `state` is complete.
    Open { widget: WidgetId, state: WidgetState },
    /// Some fields changed, or a full resync.
    Update { widget: WidgetId, state: WidgetState },
    Close { widget: WidgetId },
    /// A host message was rejected. Nothing was changed.
    Error { widget: Option<WidgetId>, message: String },
}

impl KernelMessage {
    pub fn widget(&self) -> Option<WidgetId> {
        match self {
            Self::Open { widget, .. } | Self::Update { widget, .. } | Self::Close { widget } => {
                Some(*widget)
            }
            Self::Error { widget, .. } => *widget,
        }
    }
}

/// Frontend module that renders the models.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub name: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn host_update_wire_shape() {
        let msg: HostMessage = serde_json::from_value(json!({
            "method": "update",
            "widget": 4,
            "state": {"value": 12}
        }))
        .unwrap();
        let mut state = WidgetState::new();
        state.insert("value".into(), json!(12));
        assert_eq!(msg, HostMessage::Update { widget: WidgetId::new(4), state });
    }

    #[test]
    fn kernel_error_wire_shape() {
        let msg = KernelMessage::Error { widget: None, message: "nope".into() };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"method": "error", "widget": null, "message": "nope"})
        );
        assert_eq!(msg.widget(), None);
    }
}

//! Wire shape of every protocol message.

use midicontrols_comm::protocol::*;
use midicontrols_types::WidgetId;
use serde_json::json;

fn roundtrip_host(msg: &HostMessage) -> HostMessage {
    let json = serde_json::to_string(msg).expect("serialize HostMessage");
    serde_json::from_str(&json).expect("deserialize HostMessage")
}

fn roundtrip_kernel(msg: &KernelMessage) -> KernelMessage {
    let json = serde_json::to_string(msg).expect("serialize KernelMessage");
    serde_json::from_str(&json).expect("deserialize KernelMessage")
}

fn state_of(v: serde_json::Value) -> WidgetState {
    v.as_object().cloned().expect("object")
}

#[test]
fn test_host_messages_roundtrip() {
    let msgs = [
        HostMessage::Update { widget: WidgetId::new(2), state: state_of(json!({"value": true})) },
        HostMessage::RequestState { widget: WidgetId::new(9) },
        HostMessage::Close { widget: WidgetId::new(1) },
    ];
    for msg in &msgs {
        assert_eq!(&roundtrip_host(msg), msg);
    }
}

#[test]
fn test_kernel_messages_roundtrip() {
    let msgs = [
        KernelMessage::Open {
            widget: WidgetId::new(3),
            state: state_of(json!({"_model_name": "RotaryModel", "value": 0})),
        },
        KernelMessage::Update { widget: WidgetId::new(3), state: state_of(json!({"max": 10})) },
        KernelMessage::Close { widget: WidgetId::new(3) },
        KernelMessage::Error { widget: Some(WidgetId::new(3)), message: "setting min > max (5 > 1)".into() },
    ];
    for msg in &msgs {
        assert_eq!(&roundtrip_kernel(msg), msg);
    }
}

#[test]
fn test_method_tags() {
    let v = serde_json::to_value(HostMessage::RequestState { widget: WidgetId::new(4) }).unwrap();
    assert_eq!(v, json!({"method": "request_state", "widget": 4}));

    let v = serde_json::to_value(KernelMessage::Close { widget: WidgetId::new(4) }).unwrap();
    assert_eq!(v, json!({"method": "close", "widget": 4}));
}

#[test]
fn test_unknown_method_rejected() {
    let bad = json!({"method": "custom", "widget": 1});
    assert!(serde_json::from_value::<HostMessage>(bad).is_err());
}

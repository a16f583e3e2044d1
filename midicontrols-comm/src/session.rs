//! Keeps the host's copy of every widget in step with the registry.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use midicontrols_core::{Config, ObserverId, RegistryError, WidgetRegistry};
use midicontrols_types::{ChangeEvent, WidgetId, WidgetKind};

use crate::protocol::{HostMessage, KernelMessage, ModuleInfo, WidgetState};
use crate::state::{self, StateError};

/// Model side of the sync contract.
///
/// Changes made through [`registry_mut`](Self::registry_mut) are queued and
/// handed out by [`drain_outbox`](Self::drain_outbox). Changes made by
/// [`handle`](Self::handle) are answered directly.
pub struct CommSession {
    registry: WidgetRegistry,
    module: ModuleInfo,
    outbox: Rc<RefCell<Vec<ChangeEvent>>>,
    observer: ObserverId,
}

impl CommSession {
    pub fn new(mut registry: WidgetRegistry, config: &Config) -> Self {
        let outbox = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&outbox);
        let observer = registry.on_change(move |e| sink.borrow_mut().push(e.clone()));
        let module = ModuleInfo {
            name: config.module_name().to_string(),
            version: config.module_version().to_string(),
        };
        Self { registry, module, outbox, observer }
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WidgetRegistry {
        &mut self.registry
    }

    pub fn module(&self) -> &ModuleInfo {
        &self.module
    }

    /// Stop tracking and hand the registry back.
    pub fn into_registry(mut self) -> WidgetRegistry {
        self.registry.remove_observer(self.observer);
        self.registry
    }

    pub fn state_of(&self, id: WidgetId) -> Option<WidgetState> {
        self.registry.widget(id).map(|w| state::full_state(w, &self.module))
    }

    /// An `open` for every live widget, controls before the surfaces that
    /// reference them.
    pub fn open_all(&self) -> Vec<KernelMessage> {
        let (surfaces, controls): (Vec<WidgetId>, Vec<WidgetId>) = self
            .registry
            .ids()
            .partition(|&id| self.registry.widget(id).map(|w| w.kind()) == Some(WidgetKind::Surface));
        controls
            .into_iter()
            .chain(surfaces)
            .filter_map(|id| Some(KernelMessage::Open { widget: id, state: self.state_of(id)? }))
            .collect()
    }

    /// Close a widget from the model side.
    pub fn close(&mut self, id: WidgetId) -> Option<KernelMessage> {
        self.registry.close(id)?;
        self.outbox.borrow_mut().retain(|e| e.widget != id);
        Some(KernelMessage::Close { widget: id })
    }

    /// Apply one host message and return the replies.
    pub fn handle(&mut self, msg: HostMessage) -> Vec<KernelMessage> {
        match msg {
            HostMessage::Update { widget, state } => self.handle_update(widget, &state),
            HostMessage::RequestState { widget } => match self.state_of(widget) {
                Some(state) => vec![KernelMessage::Update { widget, state }],
                None => vec![unknown(widget)],
            },
            HostMessage::Close { widget } => {
                if self.registry.close(widget).is_none() {
                    return vec![unknown(widget)];
                }
                self.outbox.borrow_mut().retain(|e| e.widget != widget);
                Vec::new()
            }
        }
    }

    fn handle_update(&mut self, id: WidgetId, sent: &WidgetState) -> Vec<KernelMessage> {
        let mark = self.outbox.borrow().len();
        let result = self.apply_update(id, sent);
        // The host already knows what it sent; anything it doesn't is echoed below.
        self.outbox.borrow_mut().truncate(mark);

        match result {
            Ok(changes) => {
                let echo = self.echo(id, sent, &changes);
                if echo.is_empty() {
                    Vec::new()
                } else {
                    vec![KernelMessage::Update { widget: id, state: echo }]
                }
            }
            Err(message) => {
                log::warn!(target: "comm", "rejected update for widget {}: {}", id, message);
                let mut replies = vec![KernelMessage::Error { widget: Some(id), message }];
                if let Some(state) = self.state_of(id) {
                    replies.push(KernelMessage::Update { widget: id, state });
                }
                replies
            }
        }
    }

    fn apply_update(&mut self, id: WidgetId, sent: &WidgetState) -> Result<Vec<ChangeEvent>, String> {
        let fields = state::fields_from_state(sent).map_err(|e: StateError| e.to_string())?;
        self.registry.apply_fields(id, &fields).map_err(|e: RegistryError| e.to_string())
    }

    /// Fields whose stored value differs from what the host believes.
    fn echo(&self, id: WidgetId, sent: &WidgetState, changes: &[ChangeEvent]) -> WidgetState {
        let mut echo = WidgetState::new();
        let Some(widget) = self.registry.widget(id) else {
            return echo;
        };
        for (name, value) in widget.fields() {
            let stored = state::field_to_json(&value);
            let differs = match sent.get(name) {
                Some(host) => !same_value(host, &stored),
                None => changes.iter().any(|e| e.field == name),
            };
            if differs {
                echo.insert(name.to_string(), stored);
            }
        }
        echo
    }

    /// Model-side changes since the last drain, one `update` per widget in
    /// order of first change.
    pub fn drain_outbox(&mut self) -> Vec<KernelMessage> {
        let events: Vec<ChangeEvent> = self.outbox.borrow_mut().drain(..).collect();
        let mut pending: Vec<(WidgetId, WidgetState)> = Vec::new();
        for event in events {
            let slot = match pending.iter().position(|(id, _)| *id == event.widget) {
                Some(i) => i,
                None => {
                    pending.push((event.widget, WidgetState::new()));
                    pending.len() - 1
                }
            };
            pending[slot].1.insert(event.field, state::field_to_json(&event.new));
        }
        pending
            .into_iter()
            .filter(|(_, state)| !state.is_empty())
            .map(|(widget, state)| KernelMessage::Update { widget, state })
            .collect()
    }
}

fn unknown(widget: WidgetId) -> KernelMessage {
    KernelMessage::Error { widget: Some(widget), message: RegistryError::UnknownWidget(widget).to_string() }
}

/// Host numbers may arrive as whole floats.
fn same_value(host: &Value, stored: &Value) -> bool {
    if host == stored {
        return true;
    }
    match (host.as_f64(), stored.as_i64()) {
        (Some(h), Some(s)) => h == s as f64,
        _ => false,
    }
}

impl std::fmt::Debug for CommSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommSession")
            .field("registry", &self.registry)
            .field("module", &self.module)
            .field("pending", &self.outbox.borrow().len())
            .finish()
    }
}

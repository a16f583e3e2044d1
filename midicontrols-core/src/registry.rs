//! Ownership of live widgets and the on-change hook.
//!
//! Every mutation goes through the registry so that it can diff the widget's
//! fields before and after and tell observers exactly what moved. Models
//! themselves stay plain data.

use std::collections::BTreeMap;
use std::fmt;

use midicontrols_types::{
    ChangeEvent, ControlSurface, FieldError, FieldValue, Handle, Model, Widget, WidgetId,
    WidgetKind,
};

/// Token returned by [`WidgetRegistry::on_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&ChangeEvent)>;

/// Error from a registry operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    UnknownWidget(WidgetId),
    WrongKind { widget: WidgetId, expected: WidgetKind, found: WidgetKind },
    /// A surface group named a widget that is missing or of the wrong model.
    BadReference { field: String, widget: WidgetId, expected: WidgetKind },
    Field(FieldError),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownWidget(id) => write!(f, "no widget with id {}", id),
            Self::WrongKind { widget, expected, found } => {
                write!(f, "widget {} is a {}, not a {}", widget, found, expected)
            }
            Self::BadReference { field, widget, expected } => {
                write!(f, "'{}' references widget {}, which is not a live {}", field, widget, expected)
            }
            Self::Field(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RegistryError {}

impl From<FieldError> for RegistryError {
    fn from(e: FieldError) -> Self {
        Self::Field(e)
    }
}

/// Result of [`WidgetRegistry::update`]: the closure's output and what changed.
#[derive(Debug)]
pub struct Updated<R> {
    pub output: R,
    pub changes: Vec<ChangeEvent>,
}

/// Owns every widget by id. Ids are never reused.
pub struct WidgetRegistry {
    widgets: BTreeMap<WidgetId, Widget>,
    next_id: u32,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("widgets", &self.widgets)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self {
            widgets: BTreeMap::new(),
            next_id: 1,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn insert<T: Model>(&mut self, model: T) -> Handle<T> {
        Handle::from_id(self.insert_widget(model.into_widget()))
    }

    pub fn insert_widget(&mut self, widget: Widget) -> WidgetId {
        let id = WidgetId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        log::debug!("registered {} as widget {}", widget.kind(), id);
        self.widgets.insert(id, widget);
        id
    }

    pub fn get<T: Model>(&self, handle: Handle<T>) -> Option<&T> {
        self.widgets.get(&handle.id()).and_then(T::from_widget)
    }

    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(&id)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Live widget ids in creation order.
    pub fn ids(&self) -> impl Iterator<Item = WidgetId> + '_ {
        self.widgets.keys().copied()
    }

    /// Check that `id` is live and of model `T`, returning its typed handle.
    pub fn handle<T: Model>(&self, id: WidgetId) -> Result<Handle<T>, RegistryError> {
        let widget = self.widgets.get(&id).ok_or(RegistryError::UnknownWidget(id))?;
        if widget.kind() != T::KIND {
            return Err(RegistryError::WrongKind { widget: id, expected: T::KIND, found: widget.kind() });
        }
        Ok(Handle::from_id(id))
    }

    /// Drop a widget. Surfaces that still reference it keep the stale id.
    pub fn close(&mut self, id: WidgetId) -> Option<Widget> {
        let removed = self.widgets.remove(&id);
        if removed.is_some() {
            log::debug!("closed widget {}", id);
        }
        removed
    }

    pub fn on_change(&mut self, observer: impl FnMut(&ChangeEvent) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    /// Mutate a widget in place and notify observers of every changed field.
    pub fn update<T: Model, R>(
        &mut self,
        handle: Handle<T>,
        f: impl FnOnce(&mut T) -> R,
    ) -> Result<Updated<R>, RegistryError> {
        let id = handle.id();
        let widget = self.widgets.get_mut(&id).ok_or(RegistryError::UnknownWidget(id))?;
        let found = widget.kind();
        let before = widget.fields();
        let model = T::from_widget_mut(widget)
            .ok_or(RegistryError::WrongKind { widget: id, expected: T::KIND, found })?;
        let output = f(model);
        let changes = ChangeEvent::diff(id, &before, &widget.fields());
        self.notify(&changes);
        Ok(Updated { output, changes })
    }

    /// Apply a named-field update coming from the host.
    ///
    /// All-or-nothing: on error the widget is unchanged and nobody is notified.
    pub fn apply_fields(
        &mut self,
        id: WidgetId,
        fields: &[(String, FieldValue)],
    ) -> Result<Vec<ChangeEvent>, RegistryError> {
        let kind = self.widgets.get(&id).ok_or(RegistryError::UnknownWidget(id))?.kind();
        if kind == WidgetKind::Surface {
            self.check_references(fields)?;
        }
        let widget = self.widgets.get_mut(&id).ok_or(RegistryError::UnknownWidget(id))?;
        let before = widget.fields();
        widget.apply_fields(fields)?;
        let changes = ChangeEvent::diff(id, &before, &widget.fields());
        self.notify(&changes);
        Ok(changes)
    }

    fn check_references(&self, fields: &[(String, FieldValue)]) -> Result<(), RegistryError> {
        for (name, value) in fields {
            let (Some(expected), FieldValue::Refs(ids)) = (ControlSurface::group_kind(name), value)
            else {
                continue;
            };
            for &child in ids {
                let live = self.widgets.get(&child).map(Widget::kind);
                if live != Some(expected) {
                    return Err(RegistryError::BadReference {
                        field: name.clone(),
                        widget: child,
                        expected,
                    });
                }
            }
        }
        Ok(())
    }

    fn notify(&mut self, changes: &[ChangeEvent]) {
        for event in changes {
            for (_, observer) in self.observers.iter_mut() {
                observer(event);
            }
        }
    }
}

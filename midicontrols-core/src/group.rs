//! Radio-style selection across a set of buttons.

use std::fmt;

use midicontrols_types::{Button, ChangeEvent, FieldValue, Handle};

use crate::registry::{RegistryError, WidgetRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupError {
    IndexOutOfRange { index: usize, len: usize },
    Registry(RegistryError),
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexOutOfRange { index, len } => {
                write!(f, "button index {} out of range for group of {}", index, len)
            }
            Self::Registry(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for GroupError {}

impl From<RegistryError> for GroupError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

/// At most one member is on at a time.
#[derive(Debug, Clone)]
pub struct ButtonGroup {
    buttons: Vec<Handle<Button>>,
    active: usize,
}

impl ButtonGroup {
    pub fn new(buttons: Vec<Handle<Button>>) -> Self {
        Self { buttons, active: 0 }
    }

    pub fn buttons(&self) -> &[Handle<Button>] {
        &self.buttons
    }

    pub fn active(&self) -> usize {
        self.active
    }

    /// Turn on the button at `index` and every other member off.
    pub fn select(&mut self, registry: &mut WidgetRegistry, index: usize) -> Result<(), GroupError> {
        if index >= self.buttons.len() {
            return Err(GroupError::IndexOutOfRange { index, len: self.buttons.len() });
        }
        self.active = index;
        for (i, &button) in self.buttons.iter().enumerate() {
            registry.update(button, |b| b.value = i == index)?;
        }
        Ok(())
    }

    /// Follow a change notification: a member switching on becomes active.
    ///
    /// Returns true if the selection moved.
    pub fn observe(
        &mut self,
        registry: &mut WidgetRegistry,
        event: &ChangeEvent,
    ) -> Result<bool, GroupError> {
        if event.field != "value" || event.new != FieldValue::Bool(true) {
            return Ok(false);
        }
        let Some(index) = self.buttons.iter().position(|b| b.id() == event.widget) else {
            return Ok(false);
        };
        let others_on = self
            .buttons
            .iter()
            .enumerate()
            .any(|(i, &b)| i != index && registry.get(b).is_some_and(|b| b.value));
        if index == self.active && !others_on {
            return Ok(false);
        }
        self.select(registry, index)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use midicontrols_types::ButtonMode;

    fn group_of(reg: &mut WidgetRegistry, n: usize) -> ButtonGroup {
        ButtonGroup::new((0..n).map(|_| reg.insert(Button::new(ButtonMode::Toggle))).collect())
    }

    fn states(reg: &WidgetRegistry, group: &ButtonGroup) -> Vec<bool> {
        group.buttons().iter().map(|&b| reg.get(b).map_or(false, |b| b.value)).collect()
    }

    #[test]
    fn select_is_exclusive() {
        let mut reg = WidgetRegistry::new();
        let mut group = group_of(&mut reg, 3);
        group.select(&mut reg, 1).unwrap();
        assert_eq!(states(&reg, &group), vec![false, true, false]);
        group.select(&mut reg, 2).unwrap();
        assert_eq!(states(&reg, &group), vec![false, false, true]);
        assert_eq!(group.active(), 2);
    }

    #[test]
    fn select_out_of_range() {
        let mut reg = WidgetRegistry::new();
        let mut group = group_of(&mut reg, 2);
        assert_eq!(
            group.select(&mut reg, 2).unwrap_err(),
            GroupError::IndexOutOfRange { index: 2, len: 2 }
        );
    }

    #[test]
    fn observe_follows_pressed_button() {
        let mut reg = WidgetRegistry::new();
        let mut group = group_of(&mut reg, 3);
        group.select(&mut reg, 0).unwrap();

        let third = group.buttons()[2];
        let updated = reg.update(third, |b| b.release()).unwrap();
        let moved = group.observe(&mut reg, &updated.changes[0]).unwrap();
        assert!(moved);
        assert_eq!(states(&reg, &group), vec![false, false, true]);

        // Switching off is not a selection.
        let updated = reg.update(third, |b| b.release()).unwrap();
        assert!(!group.observe(&mut reg, &updated.changes[0]).unwrap());
    }
}

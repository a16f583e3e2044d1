use serde::{Deserialize, Serialize};

use crate::field::FieldValue;
use crate::WidgetId;

/// One field of one widget took a new value.
///
/// Cascaded writes, such as `value` being lowered by a `max` update, are
/// reported the same way as direct writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub widget: WidgetId,
    pub field: String,
    pub old: FieldValue,
    pub new: FieldValue,
}

impl ChangeEvent {
    /// Field-by-field difference between two snapshots of the same widget.
    pub fn diff(
        widget: WidgetId,
        before: &[(&'static str, FieldValue)],
        after: &[(&'static str, FieldValue)],
    ) -> Vec<ChangeEvent> {
        before
            .iter()
            .zip(after)
            .filter(|((_, old), (_, new))| old != new)
            .map(|((name, old), (_, new))| ChangeEvent {
                widget,
                field: name.to_string(),
                old: old.clone(),
                new: new.clone(),
            })
            .collect()
    }
}

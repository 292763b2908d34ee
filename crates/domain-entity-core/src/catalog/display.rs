//! Form and view display records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Widget used to edit a field on an entity form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetType {
    /// Checkboxes or radio buttons, one per option.
    OptionsButtons,
}

/// A field placed on a display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayComponent {
    /// Widget for form displays, `None` for view displays.
    pub widget: Option<WidgetType>,
    /// Ordering weight.
    pub weight: i32,
}

/// The default form or view display of one bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDisplay {
    /// Components keyed by field name.
    pub components: BTreeMap<String, DisplayComponent>,
}

impl EntityDisplay {
    /// Place a field on the display.
    pub fn set_component(&mut self, field: impl Into<String>, component: DisplayComponent) {
        self.components.insert(field.into(), component);
    }

    /// Remove a field from the display. Returns whether it was present.
    pub fn remove_component(&mut self, field: &str) -> bool {
        self.components.remove(field).is_some()
    }

    /// Get a placed component.
    pub fn component(&self, field: &str) -> Option<&DisplayComponent> {
        self.components.get(field)
    }
}

//! Enabled-kind delta.
//!
//! Compares the enabled kinds with the kinds checked on a submission.

use serde::Serialize;
use std::collections::BTreeSet;

/// Kinds to enable and disable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KindDelta {
    /// Checked kinds without a field storage.
    pub create: Vec<String>,
    /// Enabled kinds no longer checked.
    pub delete: Vec<String>,
}

impl KindDelta {
    /// Compute the delta over `all` kinds.
    ///
    /// Ids that are checked but not part of `all` are ignored, as are kinds
    /// whose state already matches.
    pub fn compute<'a, I>(all: I, enabled: &BTreeSet<String>, checked: &BTreeSet<String>) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut delta = KindDelta::default();

        for kind_id in all {
            let is_enabled = enabled.contains(kind_id);
            let is_checked = checked.contains(kind_id);

            match (is_enabled, is_checked) {
                (true, false) => delta.delete.push(kind_id.to_string()),
                (false, true) => delta.create.push(kind_id.to_string()),
                _ => {}
            }
        }

        delta
    }

    /// Check if there are any changes.
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.delete.is_empty()
    }

    /// Get the total number of changes.
    pub fn change_count(&self) -> usize {
        self.create.len() + self.delete.len()
    }
}

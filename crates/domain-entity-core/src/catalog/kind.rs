//! Entity kind and bundle definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named sub-type of an entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    /// Bundle machine name, unique within its kind.
    pub id: String,
    /// Human label.
    pub label: String,
}

/// Bundle information as reported by the host bundle registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleInfo {
    /// Human label.
    pub label: String,
}

/// A class of content objects known to the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityKind {
    /// Kind machine name (unique).
    pub id: String,
    /// Human label.
    pub label: String,
    /// Whether the kind can carry attached fields.
    #[serde(default = "default_true")]
    pub fieldable: bool,
    /// Whether the kind has a bundle concept at all.
    #[serde(default = "default_true")]
    pub bundleable: bool,
    /// Declared bundles. Ignored when `bundleable` is false.
    #[serde(default)]
    pub bundles: Vec<Bundle>,
}

fn default_true() -> bool {
    true
}

impl Bundle {
    /// Create a bundle.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

impl EntityKind {
    /// Create a fieldable kind with bundle support and no bundles yet.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            fieldable: true,
            bundleable: true,
            bundles: Vec::new(),
        }
    }

    /// Add a bundle.
    pub fn with_bundle(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.bundles.push(Bundle::new(id, label));
        self
    }

    /// Mark the kind as having no bundle concept.
    ///
    /// Such a kind owns one implicit bundle named after the kind itself.
    pub fn without_bundles(mut self) -> Self {
        self.bundleable = false;
        self.bundles.clear();
        self
    }

    /// Mark the kind as not fieldable.
    pub fn not_fieldable(mut self) -> Self {
        self.fieldable = false;
        self
    }

    /// Effective bundles of the kind, including the implicit one.
    pub fn bundles(&self) -> Vec<Bundle> {
        if self.bundleable {
            self.bundles.clone()
        } else {
            vec![Bundle::new(self.id.clone(), self.label.clone())]
        }
    }

    /// Effective bundles keyed by id, in the shape of the host bundle registry.
    pub fn bundle_info(&self) -> BTreeMap<String, BundleInfo> {
        self.bundles()
            .into_iter()
            .map(|b| (b.id, BundleInfo { label: b.label }))
            .collect()
    }

    /// Check whether the kind owns the given bundle.
    pub fn has_bundle(&self, bundle: &str) -> bool {
        self.bundles().iter().any(|b| b.id == bundle)
    }
}

//! Collaborator interfaces provided by the host platform.
//!
//! The mapper and the settings forms never touch host internals directly.
//! Everything they read or mutate goes through these traits, which the
//! [`store`](crate::store) module implements in memory and on sled.

use crate::catalog::{BundleInfo, EntityDisplay, EntityKind, ScopingFieldConfig, ScopingFieldStorage};
use crate::error::Result;
use crate::settings::ModuleSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Permission required for the per-kind settings screen.
pub const ADMINISTER_DOMAINS: &str = "administer domains";

/// Entity kinds and bundles known to the host.
pub trait EntityKindRegistry: Send + Sync {
    /// All entity kind definitions keyed by id.
    fn definitions(&self) -> BTreeMap<String, EntityKind>;

    /// A single definition.
    fn definition(&self, id: &str) -> Option<EntityKind> {
        self.definitions().remove(id)
    }

    /// Bundles of a kind keyed by bundle id. Bundle-less kinds report one
    /// bundle named after the kind.
    fn bundle_info(&self, kind_id: &str) -> BTreeMap<String, BundleInfo> {
        self.definition(kind_id)
            .map(|kind| kind.bundle_info())
            .unwrap_or_default()
    }
}

/// Bounded existence check over persisted entity instances.
pub trait EntityProbe: Send + Sync {
    /// Whether at least one instance of the kind is stored.
    fn has_instances(&self, kind_id: &str) -> Result<bool>;
}

/// Persistence of field storages and field configs.
///
/// Keys are the composite ids from [`storage_id`](crate::catalog::storage_id)
/// and [`config_id`](crate::catalog::config_id).
pub trait FieldPersistence: Send + Sync {
    /// Load a field storage.
    fn load_storage(&self, id: &str) -> Result<Option<ScopingFieldStorage>>;

    /// Insert or replace a field storage.
    fn save_storage(&self, storage: &ScopingFieldStorage) -> Result<()>;

    /// Delete a field storage together with every field config that uses it.
    fn delete_storage(&self, id: &str) -> Result<()>;

    /// Load a field config.
    fn load_config(&self, id: &str) -> Result<Option<ScopingFieldConfig>>;

    /// Insert or replace a field config.
    fn save_config(&self, config: &ScopingFieldConfig) -> Result<()>;

    /// Delete a field config.
    fn delete_config(&self, id: &str) -> Result<()>;

    /// All field configs of an entity kind.
    fn configs_for_kind(&self, kind_id: &str) -> Result<Vec<ScopingFieldConfig>>;
}

/// Default form and view displays of bundles.
pub trait FormDisplayRegistry: Send + Sync {
    /// Default form display of a bundle, if the host has one.
    fn form_display(&self, kind_id: &str, bundle: &str) -> Result<Option<EntityDisplay>>;

    /// Persist the default form display of a bundle.
    fn save_form_display(&self, kind_id: &str, bundle: &str, display: &EntityDisplay)
        -> Result<()>;

    /// Default view display of a bundle, if the host has one.
    fn view_display(&self, kind_id: &str, bundle: &str) -> Result<Option<EntityDisplay>>;

    /// Persist the default view display of a bundle.
    fn save_view_display(&self, kind_id: &str, bundle: &str, display: &EntityDisplay)
        -> Result<()>;
}

/// A selectable domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainOption {
    /// Domain id.
    pub id: String,
    /// Human label.
    pub label: String,
}

impl DomainOption {
    /// Create an option.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// The domain registry.
pub trait DomainRegistry: Send + Sync {
    /// Domains in display order.
    fn options_list(&self) -> Vec<DomainOption>;

    /// Whether a domain id is known.
    fn contains(&self, id: &str) -> bool {
        self.options_list().iter().any(|d| d.id == id)
    }
}

/// Named configuration objects.
pub trait SettingsStore: Send + Sync {
    /// Load the settings stored under a key.
    fn load_settings(&self, key: &str) -> Result<Option<ModuleSettings>>;

    /// Store settings under a key.
    fn save_settings(&self, key: &str, settings: &ModuleSettings) -> Result<()>;
}

/// The account performing an administrative request.
pub trait AccountProxy {
    /// Whether the account holds a permission.
    fn has_permission(&self, permission: &str) -> bool;
}

//! In-memory host collaborators.

use crate::catalog::{EntityDisplay, EntityKind, ScopingFieldConfig, ScopingFieldStorage};
use crate::error::Result;
use crate::host::{
    DomainOption, DomainRegistry, EntityKindRegistry, EntityProbe, FieldPersistence,
    FormDisplayRegistry, SettingsStore,
};
use crate::settings::ModuleSettings;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// Entity kind registry backed by a map, with per-kind instance counts.
#[derive(Debug, Default)]
pub struct MemoryEntityKindRegistry {
    kinds: RwLock<BTreeMap<String, EntityKind>>,
    instances: RwLock<HashMap<String, u64>>,
}

impl MemoryEntityKindRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind (builder form).
    pub fn with_kind(self, kind: EntityKind) -> Self {
        self.register(kind);
        self
    }

    /// Register or replace a kind.
    pub fn register(&self, kind: EntityKind) {
        self.kinds.write().insert(kind.id.clone(), kind);
    }

    /// Set how many instances of a kind are stored.
    pub fn set_instance_count(&self, kind_id: impl Into<String>, count: u64) {
        self.instances.write().insert(kind_id.into(), count);
    }
}

impl EntityKindRegistry for MemoryEntityKindRegistry {
    fn definitions(&self) -> BTreeMap<String, EntityKind> {
        self.kinds.read().clone()
    }

    fn definition(&self, id: &str) -> Option<EntityKind> {
        self.kinds.read().get(id).cloned()
    }
}

impl EntityProbe for MemoryEntityKindRegistry {
    fn has_instances(&self, kind_id: &str) -> Result<bool> {
        Ok(self
            .instances
            .read()
            .get(kind_id)
            .is_some_and(|count| *count > 0))
    }
}

/// Domain registry over a fixed list.
#[derive(Debug, Default, Clone)]
pub struct StaticDomainRegistry {
    domains: Vec<DomainOption>,
}

impl StaticDomainRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a domain.
    pub fn with_domain(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.domains.push(DomainOption::new(id, label));
        self
    }

    /// Create from a list of options.
    pub fn from_options(domains: Vec<DomainOption>) -> Self {
        Self { domains }
    }
}

impl DomainRegistry for StaticDomainRegistry {
    fn options_list(&self) -> Vec<DomainOption> {
        self.domains.clone()
    }
}

#[derive(Debug, Default)]
struct FieldState {
    storages: BTreeMap<String, ScopingFieldStorage>,
    configs: BTreeMap<String, ScopingFieldConfig>,
    form_displays: BTreeMap<(String, String), EntityDisplay>,
    view_displays: BTreeMap<(String, String), EntityDisplay>,
    settings: BTreeMap<String, ModuleSettings>,
}

/// Field records, displays, and settings held in memory.
#[derive(Debug)]
pub struct MemoryFieldStore {
    state: RwLock<FieldState>,
    /// Whether every bundle has default displays.
    default_displays: bool,
}

impl Default for MemoryFieldStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFieldStore {
    /// Create an empty store where every bundle has default displays.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(FieldState::default()),
            default_displays: true,
        }
    }

    /// Create a store whose bundles have no default displays.
    pub fn without_default_displays() -> Self {
        Self {
            state: RwLock::new(FieldState::default()),
            default_displays: false,
        }
    }

    /// Number of stored field storages.
    pub fn storage_count(&self) -> usize {
        self.state.read().storages.len()
    }

    /// Number of stored field configs.
    pub fn config_count(&self) -> usize {
        self.state.read().configs.len()
    }

    fn display(
        &self,
        displays: &BTreeMap<(String, String), EntityDisplay>,
        kind_id: &str,
        bundle: &str,
    ) -> Option<EntityDisplay> {
        if !self.default_displays {
            return None;
        }
        Some(
            displays
                .get(&(kind_id.to_string(), bundle.to_string()))
                .cloned()
                .unwrap_or_default(),
        )
    }
}

impl FieldPersistence for MemoryFieldStore {
    fn load_storage(&self, id: &str) -> Result<Option<ScopingFieldStorage>> {
        Ok(self.state.read().storages.get(id).cloned())
    }

    fn save_storage(&self, storage: &ScopingFieldStorage) -> Result<()> {
        self.state
            .write()
            .storages
            .insert(storage.id(), storage.clone());
        Ok(())
    }

    fn delete_storage(&self, id: &str) -> Result<()> {
        let mut state = self.state.write();
        if state.storages.remove(id).is_some() {
            state.configs.retain(|_, config| config.storage_id() != id);
        }
        Ok(())
    }

    fn load_config(&self, id: &str) -> Result<Option<ScopingFieldConfig>> {
        Ok(self.state.read().configs.get(id).cloned())
    }

    fn save_config(&self, config: &ScopingFieldConfig) -> Result<()> {
        self.state.write().configs.insert(config.id(), config.clone());
        Ok(())
    }

    fn delete_config(&self, id: &str) -> Result<()> {
        self.state.write().configs.remove(id);
        Ok(())
    }

    fn configs_for_kind(&self, kind_id: &str) -> Result<Vec<ScopingFieldConfig>> {
        Ok(self
            .state
            .read()
            .configs
            .values()
            .filter(|c| c.entity_kind == kind_id)
            .cloned()
            .collect())
    }
}

impl FormDisplayRegistry for MemoryFieldStore {
    fn form_display(&self, kind_id: &str, bundle: &str) -> Result<Option<EntityDisplay>> {
        let state = self.state.read();
        Ok(self.display(&state.form_displays, kind_id, bundle))
    }

    fn save_form_display(
        &self,
        kind_id: &str,
        bundle: &str,
        display: &EntityDisplay,
    ) -> Result<()> {
        self.state
            .write()
            .form_displays
            .insert((kind_id.to_string(), bundle.to_string()), display.clone());
        Ok(())
    }

    fn view_display(&self, kind_id: &str, bundle: &str) -> Result<Option<EntityDisplay>> {
        let state = self.state.read();
        Ok(self.display(&state.view_displays, kind_id, bundle))
    }

    fn save_view_display(
        &self,
        kind_id: &str,
        bundle: &str,
        display: &EntityDisplay,
    ) -> Result<()> {
        self.state
            .write()
            .view_displays
            .insert((kind_id.to_string(), bundle.to_string()), display.clone());
        Ok(())
    }
}

impl SettingsStore for MemoryFieldStore {
    fn load_settings(&self, key: &str) -> Result<Option<ModuleSettings>> {
        Ok(self.state.read().settings.get(key).copied())
    }

    fn save_settings(&self, key: &str, settings: &ModuleSettings) -> Result<()> {
        self.state.write().settings.insert(key.to_string(), *settings);
        Ok(())
    }
}

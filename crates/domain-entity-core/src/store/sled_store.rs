//! Field records persisted in sled.

use crate::catalog::{EntityDisplay, ScopingFieldConfig, ScopingFieldStorage};
use crate::error::Result;
use crate::host::{FieldPersistence, FormDisplayRegistry, SettingsStore};
use crate::settings::ModuleSettings;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::{Batch, Db, Tree};

/// Tree name for field storages.
const STORAGE_TREE: &str = "domain_entity:storages";

/// Tree name for field configs.
const FIELD_TREE: &str = "domain_entity:fields";

/// Tree name for form and view displays.
const DISPLAY_TREE: &str = "domain_entity:displays";

/// Tree name for configuration objects.
const SETTINGS_TREE: &str = "domain_entity:settings";

const FORM_PREFIX: &str = "form:";
const VIEW_PREFIX: &str = "view:";

/// Field storages, field configs, displays, and settings in one sled database.
///
/// Every bundle is treated as having default form and view displays.
pub struct SledFieldStore {
    storage_tree: Tree,
    field_tree: Tree,
    display_tree: Tree,
    settings_tree: Tree,
}

impl SledFieldStore {
    /// Open or create the store in the given database.
    pub fn open(db: &Db) -> Result<Self> {
        Ok(Self {
            storage_tree: db.open_tree(STORAGE_TREE)?,
            field_tree: db.open_tree(FIELD_TREE)?,
            display_tree: db.open_tree(DISPLAY_TREE)?,
            settings_tree: db.open_tree(SETTINGS_TREE)?,
        })
    }

    /// Ids of every stored field storage.
    pub fn storage_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for result in self.storage_tree.iter() {
            let (key, _) = result?;
            ids.push(String::from_utf8_lossy(&key).into_owned());
        }
        Ok(ids)
    }

    /// Flush pending writes to disk.
    pub fn flush(&self) -> Result<()> {
        self.storage_tree.flush()?;
        self.field_tree.flush()?;
        self.display_tree.flush()?;
        self.settings_tree.flush()?;
        Ok(())
    }

    fn get<T: DeserializeOwned>(tree: &Tree, key: &str) -> Result<Option<T>> {
        match tree.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(tree: &Tree, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        tree.insert(key.as_bytes(), bytes)?;
        Ok(())
    }

    fn display_key(prefix: &str, kind_id: &str, bundle: &str) -> String {
        format!("{}{}.{}", prefix, kind_id, bundle)
    }

    fn load_display(&self, prefix: &str, kind_id: &str, bundle: &str) -> Result<EntityDisplay> {
        let key = Self::display_key(prefix, kind_id, bundle);
        Ok(Self::get(&self.display_tree, &key)?.unwrap_or_default())
    }
}

impl FieldPersistence for SledFieldStore {
    fn load_storage(&self, id: &str) -> Result<Option<ScopingFieldStorage>> {
        Self::get(&self.storage_tree, id)
    }

    fn save_storage(&self, storage: &ScopingFieldStorage) -> Result<()> {
        Self::put(&self.storage_tree, &storage.id(), storage)
    }

    fn delete_storage(&self, id: &str) -> Result<()> {
        let Some(storage) = self.load_storage(id)? else {
            return Ok(());
        };

        let mut batch = Batch::default();
        let prefix = format!("{}.", storage.entity_kind);
        for result in self.field_tree.scan_prefix(prefix.as_bytes()) {
            let (key, value) = result?;
            let config: ScopingFieldConfig = serde_json::from_slice(&value)?;
            if config.storage_id() == id {
                batch.remove(key);
            }
        }
        self.field_tree.apply_batch(batch)?;
        self.storage_tree.remove(id.as_bytes())?;
        Ok(())
    }

    fn load_config(&self, id: &str) -> Result<Option<ScopingFieldConfig>> {
        Self::get(&self.field_tree, id)
    }

    fn save_config(&self, config: &ScopingFieldConfig) -> Result<()> {
        Self::put(&self.field_tree, &config.id(), config)
    }

    fn delete_config(&self, id: &str) -> Result<()> {
        self.field_tree.remove(id.as_bytes())?;
        Ok(())
    }

    fn configs_for_kind(&self, kind_id: &str) -> Result<Vec<ScopingFieldConfig>> {
        let mut configs = Vec::new();
        let prefix = format!("{}.", kind_id);
        for result in self.field_tree.scan_prefix(prefix.as_bytes()) {
            let (_, value) = result?;
            let config: ScopingFieldConfig = serde_json::from_slice(&value)?;
            if config.entity_kind == kind_id {
                configs.push(config);
            }
        }
        Ok(configs)
    }
}

impl FormDisplayRegistry for SledFieldStore {
    fn form_display(&self, kind_id: &str, bundle: &str) -> Result<Option<EntityDisplay>> {
        self.load_display(FORM_PREFIX, kind_id, bundle).map(Some)
    }

    fn save_form_display(
        &self,
        kind_id: &str,
        bundle: &str,
        display: &EntityDisplay,
    ) -> Result<()> {
        let key = Self::display_key(FORM_PREFIX, kind_id, bundle);
        Self::put(&self.display_tree, &key, display)
    }

    fn view_display(&self, kind_id: &str, bundle: &str) -> Result<Option<EntityDisplay>> {
        self.load_display(VIEW_PREFIX, kind_id, bundle).map(Some)
    }

    fn save_view_display(
        &self,
        kind_id: &str,
        bundle: &str,
        display: &EntityDisplay,
    ) -> Result<()> {
        let key = Self::display_key(VIEW_PREFIX, kind_id, bundle);
        Self::put(&self.display_tree, &key, display)
    }
}

impl SettingsStore for SledFieldStore {
    fn load_settings(&self, key: &str) -> Result<Option<ModuleSettings>> {
        Self::get(&self.settings_tree, key)
    }

    fn save_settings(&self, key: &str, settings: &ModuleSettings) -> Result<()> {
        Self::put(&self.settings_tree, key, settings)
    }
}

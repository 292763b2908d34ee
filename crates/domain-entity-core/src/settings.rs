//! Module-wide settings.

use crate::error::Result;
use crate::host::SettingsStore;
use serde::{Deserialize, Serialize};

/// Configuration key of the module settings.
pub const SETTINGS_KEY: &str = "domain_entity.settings";

/// Persisted module settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSettings {
    /// Skip all domain scoping enforcement.
    #[serde(default)]
    pub bypass_access_conditions: bool,
}

impl ModuleSettings {
    /// Load the settings, falling back to defaults when none are stored.
    pub fn load(store: &dyn SettingsStore) -> Result<Self> {
        Ok(store.load_settings(SETTINGS_KEY)?.unwrap_or_default())
    }

    /// Store the settings.
    pub fn save(&self, store: &dyn SettingsStore) -> Result<()> {
        store.save_settings(SETTINGS_KEY, self)?;
        tracing::info!(
            bypass_access_conditions = self.bypass_access_conditions,
            "module settings saved"
        );
        Ok(())
    }

    /// Settings with the bypass flag set.
    pub fn bypassed() -> Self {
        Self {
            bypass_access_conditions: true,
        }
    }
}

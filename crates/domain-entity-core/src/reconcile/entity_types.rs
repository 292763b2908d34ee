//! Entity kind enablement form.

use super::diff::KindDelta;
use crate::error::Result;
use crate::host::SettingsStore;
use crate::mapper::ScopingFieldMapper;
use crate::settings::ModuleSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Path prefix of the per-kind settings screen.
const SETTINGS_ROUTE_PREFIX: &str = "admin/config/domain/entities";

/// Route of the per-kind settings screen.
pub fn settings_route(kind_id: &str) -> String {
    format!("{}/{}", SETTINGS_ROUTE_PREFIX, kind_id)
}

/// One table row of the enablement form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityTypeRow {
    /// Kind id.
    pub id: String,
    /// Kind label.
    pub label: String,
    /// Whether the checkbox starts checked.
    pub enabled: bool,
    /// Link to the per-kind settings, only for enabled kinds.
    pub configure_route: Option<String>,
}

/// Rendered state of the enablement form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityTypesView {
    /// Current bypass flag.
    pub bypass_access_conditions: bool,
    /// One row per fieldable kind.
    pub rows: Vec<EntityTypeRow>,
}

impl EntityTypesView {
    /// Ids of the rows that start checked.
    pub fn enabled_ids(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .filter(|r| r.enabled)
            .map(|r| r.id.clone())
            .collect()
    }
}

/// Submitted values of the enablement form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EntityTypesSubmission {
    /// Checked kind ids.
    #[serde(default)]
    pub checked: BTreeSet<String>,
    /// Bypass flag control.
    #[serde(default)]
    pub bypass_access_conditions: bool,
}

impl EntityTypesSubmission {
    /// Empty submission: nothing checked, bypass off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a kind.
    pub fn with_checked(mut self, kind_id: impl Into<String>) -> Self {
        self.checked.insert(kind_id.into());
        self
    }

    /// Set the bypass flag control.
    pub fn with_bypass(mut self, bypass: bool) -> Self {
        self.bypass_access_conditions = bypass;
        self
    }
}

/// Form listing every fieldable entity kind with an enable checkbox.
#[derive(Clone)]
pub struct EntityTypesForm {
    mapper: ScopingFieldMapper,
    settings: Arc<dyn SettingsStore>,
}

impl EntityTypesForm {
    /// Form identifier.
    pub const FORM_ID: &'static str = "domain_entity_ui";

    /// Create the form.
    pub fn new(mapper: ScopingFieldMapper, settings: Arc<dyn SettingsStore>) -> Self {
        Self { mapper, settings }
    }

    /// Build the form state from the current configuration.
    pub fn build(&self) -> Result<EntityTypesView> {
        let settings = ModuleSettings::load(self.settings.as_ref())?;
        let enabled = self.mapper.enabled_entity_kinds()?;

        let rows = self
            .mapper
            .entity_kinds()
            .into_values()
            .map(|kind| {
                let is_enabled = enabled.contains_key(&kind.id);
                EntityTypeRow {
                    configure_route: is_enabled.then(|| settings_route(&kind.id)),
                    enabled: is_enabled,
                    id: kind.id,
                    label: kind.label,
                }
            })
            .collect();

        Ok(EntityTypesView {
            bypass_access_conditions: settings.bypass_access_conditions,
            rows,
        })
    }

    /// Apply a submission.
    ///
    /// Stores the bypass flag, then creates storages for newly checked kinds
    /// and deletes storages for unchecked enabled kinds. Kinds whose state
    /// did not change are not touched. Returns the applied delta.
    pub fn submit(&self, submission: &EntityTypesSubmission) -> Result<KindDelta> {
        ModuleSettings {
            bypass_access_conditions: submission.bypass_access_conditions,
        }
        .save(self.settings.as_ref())?;

        let all = self.mapper.entity_kinds();
        let enabled: BTreeSet<String> = self.mapper.enabled_entity_kinds()?.into_keys().collect();
        let delta = KindDelta::compute(all.keys().map(String::as_str), &enabled, &submission.checked);

        for kind_id in &delta.create {
            self.mapper.create_field_storage(kind_id)?;
        }
        for kind_id in &delta.delete {
            self.mapper.delete_field_storage(kind_id)?;
        }

        tracing::info!(
            created = delta.create.len(),
            deleted = delta.delete.len(),
            "entity kind settings applied"
        );
        Ok(delta)
    }
}

impl std::fmt::Debug for EntityTypesForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityTypesForm")
            .field("mapper", &self.mapper)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntityKind;
    use crate::store::{MemoryEntityKindRegistry, MemoryFieldStore};

    fn form() -> (EntityTypesForm, ScopingFieldMapper, Arc<MemoryFieldStore>) {
        let registry = MemoryEntityKindRegistry::new()
            .with_kind(EntityKind::new("event", "Event").with_bundle("conference", "Conference"))
            .with_kind(EntityKind::new("node", "Content").with_bundle("article", "Article"))
            .with_kind(EntityKind::new("config", "Config").not_fieldable());
        let store = Arc::new(MemoryFieldStore::new());
        let mapper = ScopingFieldMapper::new(Arc::new(registry), store.clone(), store.clone());
        let form = EntityTypesForm::new(mapper.clone(), store.clone());
        (form, mapper, store)
    }

    #[test]
    fn test_build_initial() {
        let (form, _, _) = form();
        let view = form.build().unwrap();

        assert!(!view.bypass_access_conditions);
        assert_eq!(view.rows.len(), 2);
        assert!(view.rows.iter().all(|r| !r.enabled && r.configure_route.is_none()));
    }

    #[test]
    fn test_submit_enables_and_links() {
        let (form, mapper, _) = form();
        let delta = form
            .submit(&EntityTypesSubmission::new().with_checked("event"))
            .unwrap();
        assert_eq!(delta.create, vec!["event"]);

        let view = form.build().unwrap();
        let event = view.rows.iter().find(|r| r.id == "event").unwrap();
        assert!(event.enabled);
        assert_eq!(
            event.configure_route.as_deref(),
            Some("admin/config/domain/entities/event")
        );
        assert!(mapper.enabled_entity_kinds().unwrap().contains_key("event"));
    }

    #[test]
    fn test_resubmit_is_noop() {
        let (form, _, _) = form();
        let submission = EntityTypesSubmission::new().with_checked("event");
        form.submit(&submission).unwrap();

        let delta = form.submit(&submission).unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn test_bypass_flag_saved() {
        let (form, _, store) = form();
        form.submit(&EntityTypesSubmission::new().with_bypass(true))
            .unwrap();

        assert!(ModuleSettings::load(store.as_ref()).unwrap().bypass_access_conditions);
        assert!(form.build().unwrap().bypass_access_conditions);

        form.submit(&EntityTypesSubmission::new()).unwrap();
        assert!(!ModuleSettings::load(store.as_ref()).unwrap().bypass_access_conditions);
    }

    #[test]
    fn test_non_fieldable_kind_cannot_be_enabled() {
        let (form, _, store) = form();
        let delta = form
            .submit(&EntityTypesSubmission::new().with_checked("config"))
            .unwrap();
        assert!(delta.is_empty());
        assert_eq!(store.storage_count(), 0);
    }
}

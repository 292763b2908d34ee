//! Domain access field mapper.
//!
//! Decides which entity kinds are domain enabled and creates or removes the
//! field storage and per-bundle field configs that carry the domain access
//! field. A kind is enabled exactly when its field storage exists.

use crate::catalog::{
    config_id, storage_id, Behavior, DisplayComponent, EntityKind, ScopingFieldConfig,
    ScopingFieldStorage, WidgetType, FIELD_NAME,
};
use crate::error::{Error, Result};
use crate::host::{EntityKindRegistry, FieldPersistence, FormDisplayRegistry};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Lifecycle state of one entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindState {
    /// No field storage.
    Disabled,
    /// Field storage exists but no bundle carries the field.
    EnabledNoBundles,
    /// Field storage exists and at least one bundle carries the field.
    EnabledConfigured,
}

impl KindState {
    /// Whether the kind has a field storage.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, KindState::Disabled)
    }
}

impl fmt::Display for KindState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindState::Disabled => write!(f, "disabled"),
            KindState::EnabledNoBundles => write!(f, "enabled (no bundles)"),
            KindState::EnabledConfigured => write!(f, "enabled"),
        }
    }
}

/// Field operations for the domain access field.
#[derive(Clone)]
pub struct ScopingFieldMapper {
    kinds: Arc<dyn EntityKindRegistry>,
    fields: Arc<dyn FieldPersistence>,
    displays: Arc<dyn FormDisplayRegistry>,
}

impl ScopingFieldMapper {
    /// Create a mapper over the host collaborators.
    pub fn new(
        kinds: Arc<dyn EntityKindRegistry>,
        fields: Arc<dyn FieldPersistence>,
        displays: Arc<dyn FormDisplayRegistry>,
    ) -> Self {
        Self {
            kinds,
            fields,
            displays,
        }
    }

    /// The entity kind registry.
    pub fn registry(&self) -> &dyn EntityKindRegistry {
        self.kinds.as_ref()
    }

    /// Fieldable entity kinds keyed by id.
    pub fn entity_kinds(&self) -> BTreeMap<String, EntityKind> {
        self.kinds
            .definitions()
            .into_iter()
            .filter(|(_, kind)| kind.fieldable)
            .collect()
    }

    /// Fieldable entity kinds that have the field storage.
    pub fn enabled_entity_kinds(&self) -> Result<BTreeMap<String, EntityKind>> {
        let mut result = BTreeMap::new();
        for (id, kind) in self.entity_kinds() {
            if self.fields.load_storage(&storage_id(&id))?.is_some() {
                result.insert(id, kind);
            }
        }
        Ok(result)
    }

    /// Resolve a kind id, failing when the host does not know it or the kind
    /// cannot carry fields.
    pub fn entity_kind(&self, kind_id: &str) -> Result<EntityKind> {
        self.kinds
            .definition(kind_id)
            .filter(|kind| kind.fieldable)
            .ok_or_else(|| Error::KindNotFound(kind_id.to_string()))
    }

    /// Load the field storage of a kind.
    pub fn load_field_storage(&self, kind_id: &str) -> Result<Option<ScopingFieldStorage>> {
        self.entity_kind(kind_id)?;
        self.fields.load_storage(&storage_id(kind_id))
    }

    /// Load the field config of a bundle.
    pub fn load_field_config(
        &self,
        kind_id: &str,
        bundle: &str,
    ) -> Result<Option<ScopingFieldConfig>> {
        self.entity_kind(kind_id)?;
        self.fields.load_config(&config_id(kind_id, bundle))
    }

    /// All field configs of a kind.
    pub fn field_configs(&self, kind_id: &str) -> Result<Vec<ScopingFieldConfig>> {
        self.entity_kind(kind_id)?;
        self.fields.configs_for_kind(kind_id)
    }

    /// Current lifecycle state of a kind.
    pub fn kind_state(&self, kind_id: &str) -> Result<KindState> {
        if self.load_field_storage(kind_id)?.is_none() {
            return Ok(KindState::Disabled);
        }
        if self.fields.configs_for_kind(kind_id)?.is_empty() {
            Ok(KindState::EnabledNoBundles)
        } else {
            Ok(KindState::EnabledConfigured)
        }
    }

    /// Create the field storage of a kind, returning the existing one if present.
    pub fn create_field_storage(&self, kind_id: &str) -> Result<ScopingFieldStorage> {
        if let Some(storage) = self.load_field_storage(kind_id)? {
            tracing::debug!(entity_kind = %kind_id, "field storage already exists");
            return Ok(storage);
        }

        let storage = ScopingFieldStorage::for_kind(kind_id);
        self.fields.save_storage(&storage)?;
        tracing::info!(entity_kind = %kind_id, storage = %storage.id(), "field storage created");
        Ok(storage)
    }

    /// Delete the field storage of a kind and, through the persistence layer,
    /// every field config that uses it.
    ///
    /// Returns whether a storage was deleted.
    pub fn delete_field_storage(&self, kind_id: &str) -> Result<bool> {
        let Some(storage) = self.load_field_storage(kind_id)? else {
            tracing::debug!(entity_kind = %kind_id, "no field storage to delete");
            return Ok(false);
        };

        self.fields.delete_storage(&storage.id())?;
        tracing::info!(entity_kind = %kind_id, storage = %storage.id(), "field storage deleted");
        Ok(true)
    }

    /// Attach the domain access field to a bundle.
    ///
    /// Creates the field storage when needed. An existing field config is
    /// returned unchanged. A new one gets the default settings, an options
    /// widget on the default form display, and is hidden from the default view
    /// display.
    pub fn add_domain_field(&self, kind_id: &str, bundle: &str) -> Result<ScopingFieldConfig> {
        let kind = self.entity_kind(kind_id)?;
        if !kind.has_bundle(bundle) {
            return Err(Error::BundleNotFound {
                kind: kind_id.to_string(),
                bundle: bundle.to_string(),
            });
        }

        self.create_field_storage(kind_id)?;

        if let Some(config) = self.fields.load_config(&config_id(kind_id, bundle))? {
            tracing::debug!(entity_kind = %kind_id, bundle = %bundle, "domain field already attached");
            return Ok(config);
        }

        let config = ScopingFieldConfig::new(kind_id, bundle);
        self.fields.save_config(&config)?;
        tracing::info!(entity_kind = %kind_id, bundle = %bundle, "domain field attached");

        match self.displays.form_display(kind_id, bundle)? {
            Some(mut display) => {
                display.set_component(
                    FIELD_NAME,
                    DisplayComponent {
                        widget: Some(WidgetType::OptionsButtons),
                        weight: 0,
                    },
                );
                self.displays.save_form_display(kind_id, bundle, &display)?;
            }
            None => {
                tracing::debug!(entity_kind = %kind_id, bundle = %bundle, "no default form display");
            }
        }

        match self.displays.view_display(kind_id, bundle)? {
            Some(mut display) => {
                display.remove_component(FIELD_NAME);
                self.displays.save_view_display(kind_id, bundle, &display)?;
            }
            None => {
                tracing::debug!(entity_kind = %kind_id, bundle = %bundle, "no default view display");
            }
        }

        Ok(config)
    }

    /// Detach the domain access field from a bundle.
    ///
    /// Returns whether a field config was deleted.
    pub fn remove_domain_field(&self, kind_id: &str, bundle: &str) -> Result<bool> {
        let Some(config) = self.load_field_config(kind_id, bundle)? else {
            return Ok(false);
        };

        self.fields.delete_config(&config.id())?;
        tracing::info!(entity_kind = %kind_id, bundle = %bundle, "domain field removed");
        Ok(true)
    }

    /// Store the behavior and default domains of an attached field.
    pub fn update_field_settings(
        &self,
        kind_id: &str,
        bundle: &str,
        behavior: Behavior,
        default_domains: Vec<String>,
    ) -> Result<ScopingFieldConfig> {
        let mut config =
            self.load_field_config(kind_id, bundle)?
                .ok_or_else(|| Error::BundleNotFound {
                    kind: kind_id.to_string(),
                    bundle: bundle.to_string(),
                })?;

        config.behavior = behavior;
        config.default_domains = default_domains;
        self.fields.save_config(&config)?;
        tracing::info!(
            entity_kind = %kind_id,
            bundle = %bundle,
            behavior = %behavior,
            default_domains = ?config.default_domains,
            "domain field settings saved"
        );
        Ok(config)
    }
}

impl fmt::Debug for ScopingFieldMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopingFieldMapper").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Cardinality;
    use crate::store::{MemoryEntityKindRegistry, MemoryFieldStore};

    struct Fixture {
        store: Arc<MemoryFieldStore>,
        mapper: ScopingFieldMapper,
    }

    fn fixture_with(store: MemoryFieldStore) -> Fixture {
        let registry = MemoryEntityKindRegistry::new()
            .with_kind(
                EntityKind::new("event", "Event")
                    .with_bundle("conference", "Conference")
                    .with_bundle("webinar", "Webinar"),
            )
            .with_kind(EntityKind::new("order", "Order").without_bundles())
            .with_kind(EntityKind::new("file_usage", "File usage").not_fieldable());
        let store = Arc::new(store);
        let mapper = ScopingFieldMapper::new(Arc::new(registry), store.clone(), store.clone());
        Fixture { store, mapper }
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryFieldStore::new())
    }

    #[test]
    fn test_entity_kinds_are_fieldable_only() {
        let f = fixture();
        let kinds = f.mapper.entity_kinds();
        assert_eq!(
            kinds.keys().collect::<Vec<_>>(),
            vec!["event", "order"]
        );
        assert!(f.mapper.enabled_entity_kinds().unwrap().is_empty());
    }

    #[test]
    fn test_create_field_storage_is_idempotent() {
        let f = fixture();
        let first = f.mapper.create_field_storage("event").unwrap();
        let second = f.mapper.create_field_storage("event").unwrap();

        assert_eq!(first, second);
        assert_eq!(f.store.storage_count(), 1);
        assert_eq!(first.cardinality, Cardinality::Unlimited);
        assert!(!first.locked);
        assert!(f.mapper.enabled_entity_kinds().unwrap().contains_key("event"));
    }

    #[test]
    fn test_unknown_kind_is_not_found() {
        let f = fixture();
        assert!(matches!(
            f.mapper.create_field_storage("ghost"),
            Err(Error::KindNotFound(_))
        ));
        assert!(f.mapper.delete_field_storage("ghost").unwrap_err().is_not_found());
        assert!(f.mapper.add_domain_field("ghost", "x").unwrap_err().is_not_found());
        assert!(f.mapper.load_field_config("ghost", "x").unwrap_err().is_not_found());
    }

    #[test]
    fn test_non_fieldable_kind_is_not_found() {
        let f = fixture();
        assert!(matches!(
            f.mapper.create_field_storage("file_usage"),
            Err(Error::KindNotFound(_))
        ));
        assert!(matches!(
            f.mapper.add_domain_field("file_usage", "file_usage"),
            Err(Error::KindNotFound(_))
        ));
        assert!(f.mapper.load_field_storage("file_usage").unwrap_err().is_not_found());
        assert!(f.mapper.delete_field_storage("file_usage").unwrap_err().is_not_found());
        assert!(f.mapper.kind_state("file_usage").unwrap_err().is_not_found());
        assert_eq!(f.store.storage_count(), 0);
        assert_eq!(f.store.config_count(), 0);
    }

    #[test]
    fn test_delete_absent_storage() {
        let f = fixture();
        assert!(!f.mapper.delete_field_storage("event").unwrap());
    }

    #[test]
    fn test_add_domain_field_is_idempotent() {
        let f = fixture();
        let first = f.mapper.add_domain_field("event", "conference").unwrap();
        let second = f.mapper.add_domain_field("event", "conference").unwrap();

        assert_eq!(first, second);
        assert_eq!(f.store.storage_count(), 1);
        assert_eq!(f.store.config_count(), 1);
        assert_eq!(first.behavior, Behavior::Auto);
        assert!(first.default_domains.is_empty());
    }

    #[test]
    fn test_add_domain_field_wires_displays() {
        let f = fixture();
        f.mapper.add_domain_field("event", "webinar").unwrap();

        let form = f.store.form_display("event", "webinar").unwrap().unwrap();
        assert_eq!(
            form.component(FIELD_NAME).and_then(|c| c.widget),
            Some(WidgetType::OptionsButtons)
        );
        let view = f.store.view_display("event", "webinar").unwrap().unwrap();
        assert!(view.component(FIELD_NAME).is_none());
    }

    #[test]
    fn test_add_domain_field_without_displays() {
        let f = fixture_with(MemoryFieldStore::without_default_displays());
        let config = f.mapper.add_domain_field("event", "webinar").unwrap();
        assert_eq!(config.bundle, "webinar");
        assert_eq!(f.store.config_count(), 1);
    }

    #[test]
    fn test_add_domain_field_rejects_unknown_bundle() {
        let f = fixture();
        let err = f.mapper.add_domain_field("event", "meetup").unwrap_err();
        assert!(matches!(err, Error::BundleNotFound { .. }));
        assert_eq!(f.store.storage_count(), 0);
    }

    #[test]
    fn test_implicit_bundle() {
        let f = fixture();
        f.mapper.add_domain_field("order", "order").unwrap();
        assert!(f.mapper.load_field_config("order", "order").unwrap().is_some());
    }

    #[test]
    fn test_kind_state_transitions() {
        let f = fixture();
        assert_eq!(f.mapper.kind_state("event").unwrap(), KindState::Disabled);

        f.mapper.create_field_storage("event").unwrap();
        assert_eq!(
            f.mapper.kind_state("event").unwrap(),
            KindState::EnabledNoBundles
        );

        f.mapper.add_domain_field("event", "conference").unwrap();
        assert_eq!(
            f.mapper.kind_state("event").unwrap(),
            KindState::EnabledConfigured
        );

        f.mapper.remove_domain_field("event", "conference").unwrap();
        assert_eq!(
            f.mapper.kind_state("event").unwrap(),
            KindState::EnabledNoBundles
        );
    }

    #[test]
    fn test_delete_storage_cascades() {
        let f = fixture();
        f.mapper.add_domain_field("event", "conference").unwrap();
        f.mapper.add_domain_field("event", "webinar").unwrap();
        assert_eq!(f.mapper.field_configs("event").unwrap().len(), 2);

        assert!(f.mapper.delete_field_storage("event").unwrap());
        assert!(f.mapper.field_configs("event").unwrap().is_empty());
        assert_eq!(f.mapper.kind_state("event").unwrap(), KindState::Disabled);
    }

    #[test]
    fn test_update_field_settings() {
        let f = fixture();
        f.mapper.add_domain_field("event", "conference").unwrap();

        let config = f
            .mapper
            .update_field_settings("event", "conference", Behavior::User, vec!["d1".into()])
            .unwrap();
        assert_eq!(config.behavior, Behavior::User);

        let loaded = f
            .mapper
            .load_field_config("event", "conference")
            .unwrap()
            .unwrap();
        assert_eq!(loaded.default_domains, vec!["d1"]);

        let err = f
            .mapper
            .update_field_settings("event", "webinar", Behavior::Auto, Vec::new())
            .unwrap_err();
        assert!(err.is_not_found());
    }
}

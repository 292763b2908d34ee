//! Domain scoping as seen by access filtering.
//!
//! Turns the persisted field configuration into the map of allowed entity
//! kinds, resolves default values for new entities, and decides which
//! condition a query over a kind must carry. The bypass flag is passed in
//! explicitly through [`ModuleSettings`].

use crate::catalog::{Behavior, ScopingFieldConfig, ACTIVE_DOMAIN_TOKEN, FIELD_NAME};
use crate::error::Result;
use crate::mapper::ScopingFieldMapper;
use crate::settings::ModuleSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Assignment settings of one configured bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleScope {
    /// Assignment behavior.
    pub behavior: Behavior,
    /// Default domain ids, may contain [`ACTIVE_DOMAIN_TOKEN`].
    pub default_domains: Vec<String>,
}

impl From<&ScopingFieldConfig> for BundleScope {
    fn from(config: &ScopingFieldConfig) -> Self {
        Self {
            behavior: config.behavior,
            default_domains: config.default_domains.clone(),
        }
    }
}

impl BundleScope {
    /// Field value for a new entity of this bundle.
    ///
    /// The active-domain token becomes the current domain. Without configured
    /// defaults the entity goes to the current domain, or to every domain
    /// (empty value) when no domain is current.
    pub fn resolve_defaults(&self, current_domain: Option<&str>) -> Vec<String> {
        if self.default_domains.is_empty() {
            return current_domain.map(|d| vec![d.to_string()]).unwrap_or_default();
        }

        let mut resolved: Vec<String> = Vec::with_capacity(self.default_domains.len());
        for id in &self.default_domains {
            let value = if id == ACTIVE_DOMAIN_TOKEN {
                match current_domain {
                    Some(domain) => domain,
                    None => continue,
                }
            } else {
                id.as_str()
            };
            if !resolved.iter().any(|r| r == value) {
                resolved.push(value.to_string());
            }
        }
        resolved
    }
}

/// Allowed entity kinds: kind id, then bundle id, then its settings.
pub type AllowedEntityTypes = BTreeMap<String, BTreeMap<String, BundleScope>>;

/// Hook that may adjust the allowed entity kinds before they are used.
///
/// Removing a kind disables filtering for it. Changing a bundle's defaults
/// changes what new entities receive. Widgets cannot be changed this way.
pub trait AllowedTypesAlter: Send + Sync {
    /// Adjust the map in place.
    fn alter(&self, allowed: &mut AllowedEntityTypes);
}

/// Collect the configured bundles of every enabled kind and run the alter hooks.
pub fn allowed_entity_types(
    mapper: &ScopingFieldMapper,
    alters: &[Arc<dyn AllowedTypesAlter>],
) -> Result<AllowedEntityTypes> {
    let mut allowed = AllowedEntityTypes::new();

    for kind_id in mapper.enabled_entity_kinds()?.into_keys() {
        let bundles: BTreeMap<String, BundleScope> = mapper
            .field_configs(&kind_id)?
            .iter()
            .map(|config| (config.bundle.clone(), BundleScope::from(config)))
            .collect();
        if !bundles.is_empty() {
            allowed.insert(kind_id, bundles);
        }
    }

    for alter in alters {
        alter.alter(&mut allowed);
    }

    Ok(allowed)
}

/// Condition a query over an entity kind must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeCondition {
    /// No restriction.
    Unrestricted,
    /// The field is empty (all domains) or contains the domain.
    DomainOrUnassigned {
        /// Field holding the domain ids.
        field: String,
        /// Current domain. `None` only matches unassigned entities.
        domain: Option<String>,
    },
}

impl ScopeCondition {
    /// Evaluate the condition against an entity's field value.
    pub fn matches(&self, entity_domains: &[String]) -> bool {
        match self {
            ScopeCondition::Unrestricted => true,
            ScopeCondition::DomainOrUnassigned { domain, .. } => {
                entity_domains.is_empty()
                    || domain
                        .as_ref()
                        .is_some_and(|d| entity_domains.iter().any(|e| e == d))
            }
        }
    }
}

/// Decides how queries over entity kinds are scoped.
#[derive(Debug, Clone)]
pub struct ScopeFilter {
    settings: ModuleSettings,
    allowed: AllowedEntityTypes,
}

impl ScopeFilter {
    /// Create a filter from the module settings and the allowed kinds.
    pub fn new(settings: ModuleSettings, allowed: AllowedEntityTypes) -> Self {
        Self { settings, allowed }
    }

    /// Whether enforcement is switched off.
    pub fn is_bypassed(&self) -> bool {
        self.settings.bypass_access_conditions
    }

    /// Whether queries over the kind are filtered.
    pub fn applies_to(&self, kind_id: &str) -> bool {
        !self.is_bypassed() && self.allowed.contains_key(kind_id)
    }

    /// Settings of a configured bundle.
    pub fn bundle_scope(&self, kind_id: &str, bundle: &str) -> Option<&BundleScope> {
        self.allowed.get(kind_id).and_then(|b| b.get(bundle))
    }

    /// Condition for a query over the kind.
    pub fn condition_for(&self, kind_id: &str, current_domain: Option<&str>) -> ScopeCondition {
        if !self.applies_to(kind_id) {
            return ScopeCondition::Unrestricted;
        }
        ScopeCondition::DomainOrUnassigned {
            field: FIELD_NAME.to_string(),
            domain: current_domain.map(str::to_string),
        }
    }

    /// Whether an entity with the given field value is visible.
    pub fn permits(
        &self,
        kind_id: &str,
        entity_domains: &[String],
        current_domain: Option<&str>,
    ) -> bool {
        self.condition_for(kind_id, current_domain)
            .matches(entity_domains)
    }
}

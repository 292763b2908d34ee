//! Host manifest.
//!
//! The CLI runs outside a host platform, so the entity kinds, their bundles,
//! instance counts, and the configured domains are read from a JSON file:
//!
//! ```json
//! {
//!   "entity_kinds": [
//!     { "id": "event", "label": "Event", "instances": 12,
//!       "bundles": [{ "id": "conference", "label": "Conference" }] },
//!     { "id": "user", "label": "User", "bundleable": false }
//!   ],
//!   "domains": [{ "id": "d1", "label": "Main site" }]
//! }
//! ```

use crate::error::{CliError, CliResult};
use domain_entity_core::{
    DomainOption, EntityKind, MemoryEntityKindRegistry, StaticDomainRegistry,
};
use serde::Deserialize;
use std::path::Path;

/// An entity kind with its stored instance count.
#[derive(Debug, Clone, Deserialize)]
pub struct KindEntry {
    /// Kind definition with its bundles.
    #[serde(flatten)]
    pub kind: EntityKind,
    /// Number of stored instances.
    #[serde(default)]
    pub instances: u64,
}

/// Parsed manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    /// Entity kinds known to the host.
    #[serde(default)]
    pub entity_kinds: Vec<KindEntry>,
    /// Configured domains in display order.
    #[serde(default)]
    pub domains: Vec<DomainOption>,
}

impl Manifest {
    /// Read a manifest file.
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Manifest(format!("cannot read {}: {}", path.display(), e))
        })?;
        let manifest = Self::parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            kinds = manifest.entity_kinds.len(),
            domains = manifest.domains.len(),
            "manifest loaded"
        );
        Ok(manifest)
    }

    /// Parse manifest JSON.
    pub fn parse(content: &str) -> CliResult<Self> {
        let manifest: Manifest =
            serde_json::from_str(content).map_err(|e| CliError::Manifest(e.to_string()))?;

        let mut seen = std::collections::HashSet::new();
        for entry in &manifest.entity_kinds {
            if !seen.insert(entry.kind.id.as_str()) {
                return Err(CliError::Manifest(format!(
                    "duplicate entity kind '{}'",
                    entry.kind.id
                )));
            }
        }
        Ok(manifest)
    }

    /// Entity kind registry with the instance counts applied.
    pub fn registry(&self) -> MemoryEntityKindRegistry {
        let registry = MemoryEntityKindRegistry::new();
        for entry in &self.entity_kinds {
            registry.register(entry.kind.clone());
            registry.set_instance_count(entry.kind.id.clone(), entry.instances);
        }
        registry
    }

    /// Domain registry.
    pub fn domain_registry(&self) -> StaticDomainRegistry {
        StaticDomainRegistry::from_options(self.domains.clone())
    }
}

//! Domain Entity Core - domain affiliation for content entity kinds.
//!
//! This crate keeps the declarative "entity kind -> bundle -> domain field"
//! mapping consistent with the stored field configuration:
//!
//! - [`ScopingFieldMapper`] creates and removes the domain access field storage
//!   of a kind and the per-bundle field configs.
//! - [`EntityTypesForm`] and [`BundleSettingsForm`] reconcile administrator
//!   input with the stored state.
//! - [`ScopeFilter`] exposes the result to access filtering.
//!
//! Host platform services are reached only through the traits in [`host`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use domain_entity_core::{EntityTypesForm, EntityTypesSubmission, ScopingFieldMapper};
//!
//! let mapper = ScopingFieldMapper::new(registry, store.clone(), store.clone());
//! let form = EntityTypesForm::new(mapper, store);
//!
//! let delta = form.submit(&EntityTypesSubmission::new().with_checked("event"))?;
//! assert_eq!(delta.create, vec!["event"]);
//! ```

pub mod catalog;
pub mod error;
pub mod host;
pub mod mapper;
pub mod reconcile;
pub mod scope;
pub mod settings;
pub mod store;

pub use catalog::{
    Behavior, Bundle, BundleInfo, EntityKind, ScopingFieldConfig, ScopingFieldStorage,
    ACTIVE_DOMAIN_TOKEN, FIELD_NAME,
};
pub use error::{Error, Result};
pub use host::{
    AccountProxy, DomainOption, DomainRegistry, EntityKindRegistry, EntityProbe,
    FieldPersistence, FormDisplayRegistry, SettingsStore, ADMINISTER_DOMAINS,
};
pub use mapper::{KindState, ScopingFieldMapper};
pub use reconcile::{
    BundleOutcome, BundleSettingsForm, BundleSettingsSubmission, BundleSettingsView,
    BundleSubmission, EntityTypesForm, EntityTypesSubmission, EntityTypesView, KindDelta,
};
pub use scope::{
    allowed_entity_types, AllowedEntityTypes, AllowedTypesAlter, BundleScope, ScopeCondition,
    ScopeFilter,
};
pub use settings::{ModuleSettings, SETTINGS_KEY};
pub use store::{MemoryEntityKindRegistry, MemoryFieldStore, SledFieldStore, StaticDomainRegistry};

//! Data model for domain-scoped entity kinds.
//!
//! Entity kinds and bundles are immutable value records reported by the host
//! platform. Field storages and field configs are the persisted records that
//! say which kinds and bundles carry the domain access field.

mod display;
mod field;
mod kind;

pub use display::{DisplayComponent, EntityDisplay, WidgetType};
pub use field::{
    config_id, storage_id, Behavior, Cardinality, DefaultValueSource, ScopingFieldConfig,
    ScopingFieldStorage, ACTIVE_DOMAIN_TOKEN, DOMAIN_TARGET_KIND, FIELD_DESCRIPTION, FIELD_LABEL,
    FIELD_NAME, FIELD_TYPE,
};
pub use kind::{Bundle, BundleInfo, EntityKind};

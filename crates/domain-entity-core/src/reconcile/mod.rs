//! Settings reconciliation.
//!
//! Two administrative forms drive every change to the scoping configuration:
//!
//! - [`EntityTypesForm`]: one checkbox per fieldable entity kind plus the
//!   global bypass flag. Submitting it creates or deletes field storages for
//!   the kinds whose checkbox changed.
//! - [`BundleSettingsForm`]: per enabled kind, one control group per bundle
//!   (enable, behavior, default domains). Submitting it attaches, updates, or
//!   detaches the bundle field configs.
//!
//! Both forms compute their changes from a snapshot read and then issue
//! separate mutating calls. Nothing is rolled back when a later call fails.

mod bundle_settings;
mod diff;
mod entity_types;

pub use bundle_settings::{
    filter_selected, BundleControls, BundleOutcome, BundleSettingsForm, BundleSettingsSubmission,
    BundleSettingsView, BundleSubmission, EXISTING_CONTENT_WARNING,
};
pub use diff::KindDelta;
pub use entity_types::{
    settings_route, EntityTypeRow, EntityTypesForm, EntityTypesSubmission, EntityTypesView,
};

//! Per-kind bundle settings form.

use crate::catalog::{Behavior, EntityKind, ACTIVE_DOMAIN_TOKEN};
use crate::error::{Error, Result};
use crate::host::{AccountProxy, DomainOption, DomainRegistry, EntityProbe, ADMINISTER_DOMAINS};
use crate::mapper::ScopingFieldMapper;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Shown when instances of the kind already exist.
pub const EXISTING_CONTENT_WARNING: &str = "* Beware you have entities of this type in your database, all unassigned entities will be assigned to the chosen default domain value(s), if you select \"current domain\" the unassigned entities will be assigned to the current domain. You can change the default value afterwards without altering the existing entities domain value(s).";

/// Label of the active-domain option.
const ACTIVE_DOMAIN_LABEL: &str = "Current domain";

/// Control group of one bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleControls {
    /// Bundle id.
    pub id: String,
    /// Bundle label.
    pub label: String,
    /// Enable checkbox state.
    pub enabled: bool,
    /// Whether the group starts expanded.
    pub open: bool,
    /// Selected behavior.
    pub behavior: Behavior,
    /// Selected default domains. Ids no longer offered are left out.
    pub default_domains: Vec<String>,
}

/// Rendered state of the bundle settings form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleSettingsView {
    /// Kind id.
    pub entity_kind: String,
    /// Page title.
    pub title: String,
    /// Behavior choices with their descriptions.
    pub behavior_options: Vec<(Behavior, String)>,
    /// Domain choices, starting with the active-domain option.
    pub domain_options: Vec<DomainOption>,
    /// One control group per bundle.
    pub bundles: Vec<BundleControls>,
    /// Informational message shown instead of the controls.
    pub message: Option<String>,
    /// Existing-content warning.
    pub warning: Option<String>,
}

/// Submitted values for one bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BundleSubmission {
    /// Enable checkbox.
    #[serde(default)]
    pub enabled: bool,
    /// Behavior selector.
    #[serde(default)]
    pub behavior: Behavior,
    /// Raw default-domains values, possibly containing unchecked entries.
    #[serde(default)]
    pub domains: Vec<String>,
}

impl BundleSubmission {
    /// An enabled bundle with the given settings.
    pub fn enabled<I, S>(behavior: Behavior, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: true,
            behavior,
            domains: domains.into_iter().map(Into::into).collect(),
        }
    }

    /// A disabled bundle.
    pub fn disabled() -> Self {
        Self::default()
    }
}

/// Submitted values of the bundle settings form.
///
/// Bundles missing from the map count as unchecked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BundleSettingsSubmission {
    /// Values keyed by bundle id.
    #[serde(default)]
    pub bundles: BTreeMap<String, BundleSubmission>,
}

impl BundleSettingsSubmission {
    /// Empty submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the values of one bundle.
    pub fn with_bundle(mut self, bundle: impl Into<String>, values: BundleSubmission) -> Self {
        self.bundles.insert(bundle.into(), values);
        self
    }
}

/// What a submission did to one bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "bundle", rename_all = "snake_case")]
pub enum BundleOutcome {
    /// Field config created with default settings.
    Attached(String),
    /// Behavior and default domains stored.
    Updated(String),
    /// Field config deleted.
    Removed(String),
    /// Unchecked bundle without a field config.
    Unchanged(String),
}

/// Drop unchecked entries from submitted checkbox values, keeping order.
///
/// Empty strings, `"0"`, and `"false"` are what unchecked boxes submit.
/// Repeated ids keep their first position.
pub fn filter_selected(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && *v != "0" && !v.eq_ignore_ascii_case("false"))
        .filter(|v| seen.insert(v.to_string()))
        .map(str::to_string)
        .collect()
}

/// Form editing the bundle-level settings of one enabled entity kind.
#[derive(Clone)]
pub struct BundleSettingsForm {
    mapper: ScopingFieldMapper,
    domains: Arc<dyn DomainRegistry>,
    probe: Arc<dyn EntityProbe>,
}

impl BundleSettingsForm {
    /// Form identifier.
    pub const FORM_ID: &'static str = "domain_entity_settings";

    /// Create the form.
    pub fn new(
        mapper: ScopingFieldMapper,
        domains: Arc<dyn DomainRegistry>,
        probe: Arc<dyn EntityProbe>,
    ) -> Self {
        Self {
            mapper,
            domains,
            probe,
        }
    }

    /// Access check for the settings screen.
    ///
    /// Unknown and disabled kinds are rejected before permissions are looked at.
    pub fn check_access(&self, kind_id: &str, account: &dyn AccountProxy) -> Result<()> {
        self.enabled_kind(kind_id)?;
        if !account.has_permission(ADMINISTER_DOMAINS) {
            return Err(Error::AccessDenied(format!(
                "'{}' permission required",
                ADMINISTER_DOMAINS
            )));
        }
        Ok(())
    }

    /// Page title.
    pub fn title(&self, kind_id: &str) -> Result<String> {
        let kind = self.mapper.entity_kind(kind_id)?;
        Ok(format!(
            "Activate domain access on {} ({})",
            kind.label, kind.id
        ))
    }

    /// Domain choices offered on the form.
    pub fn domain_options(&self) -> Vec<DomainOption> {
        let mut options = vec![DomainOption::new(ACTIVE_DOMAIN_TOKEN, ACTIVE_DOMAIN_LABEL)];
        options.extend(
            self.domains
                .options_list()
                .into_iter()
                .filter(|d| d.id != ACTIVE_DOMAIN_TOKEN),
        );
        options
    }

    /// Build the form state for an enabled kind.
    pub fn build(&self, kind_id: &str) -> Result<BundleSettingsView> {
        let kind = self.enabled_kind(kind_id)?;
        let title = self.title(kind_id)?;
        let bundles = self.mapper.registry().bundle_info(kind_id);
        let domain_options = self.domain_options();

        let mut view = BundleSettingsView {
            entity_kind: kind.id.clone(),
            title,
            behavior_options: Behavior::ALL
                .iter()
                .map(|b| (*b, b.description().to_string()))
                .collect(),
            domain_options,
            bundles: Vec::new(),
            message: None,
            warning: None,
        };

        if bundles.is_empty() {
            view.message = Some(format!(
                "Entity {} ({}) has no bundles yet.",
                kind.label, kind.id
            ));
            return Ok(view);
        }

        let offered: HashSet<&str> = view.domain_options.iter().map(|d| d.id.as_str()).collect();
        let mut has_fields = false;

        for (bundle_id, info) in bundles {
            let config = self.mapper.load_field_config(kind_id, &bundle_id)?;
            let enabled = config.is_some();
            has_fields |= enabled;

            let (behavior, default_domains) = match config {
                Some(config) => (
                    config.behavior,
                    config
                        .default_domains
                        .into_iter()
                        .filter(|d| offered.contains(d.as_str()))
                        .collect(),
                ),
                None => (Behavior::default(), Vec::new()),
            };

            view.bundles.push(BundleControls {
                id: bundle_id,
                label: info.label,
                enabled,
                open: enabled,
                behavior,
                default_domains,
            });
        }

        if has_fields && self.probe.has_instances(kind_id)? {
            view.warning = Some(EXISTING_CONTENT_WARNING.to_string());
        }

        Ok(view)
    }

    /// Apply a submission, one bundle at a time.
    ///
    /// A newly enabled bundle is attached with default settings; the submitted
    /// behavior and domains take effect on the next submission. Mutations made
    /// before a failing bundle stay committed.
    pub fn submit(
        &self,
        kind_id: &str,
        submission: &BundleSettingsSubmission,
    ) -> Result<Vec<BundleOutcome>> {
        self.enabled_kind(kind_id)?;
        let bundles = self.mapper.registry().bundle_info(kind_id);

        for bundle_id in submission.bundles.keys() {
            if !bundles.contains_key(bundle_id) {
                tracing::debug!(entity_kind = %kind_id, bundle = %bundle_id, "ignoring values for unknown bundle");
            }
        }

        let mut outcomes = Vec::with_capacity(bundles.len());
        for bundle_id in bundles.into_keys() {
            let values = submission.bundles.get(&bundle_id);
            let enabled = values.is_some_and(|v| v.enabled);

            let outcome = match values {
                Some(values) if enabled => {
                    if self.mapper.load_field_config(kind_id, &bundle_id)?.is_some() {
                        let domains = self.known_domains(kind_id, &bundle_id, &values.domains);
                        self.mapper.update_field_settings(
                            kind_id,
                            &bundle_id,
                            values.behavior,
                            domains,
                        )?;
                        BundleOutcome::Updated(bundle_id)
                    } else {
                        self.mapper.add_domain_field(kind_id, &bundle_id)?;
                        BundleOutcome::Attached(bundle_id)
                    }
                }
                _ => {
                    if self.mapper.remove_domain_field(kind_id, &bundle_id)? {
                        BundleOutcome::Removed(bundle_id)
                    } else {
                        BundleOutcome::Unchanged(bundle_id)
                    }
                }
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    fn enabled_kind(&self, kind_id: &str) -> Result<EntityKind> {
        let kind = self.mapper.entity_kind(kind_id)?;
        if self.mapper.load_field_storage(kind_id)?.is_none() {
            return Err(Error::KindNotEnabled(kind_id.to_string()));
        }
        Ok(kind)
    }

    fn known_domains(&self, kind_id: &str, bundle: &str, raw: &[String]) -> Vec<String> {
        let options: HashSet<String> = self
            .domains
            .options_list()
            .into_iter()
            .map(|d| d.id)
            .collect();

        filter_selected(raw)
            .into_iter()
            .filter(|id| {
                let known = id == ACTIVE_DOMAIN_TOKEN || options.contains(id);
                if !known {
                    tracing::warn!(
                        entity_kind = %kind_id,
                        bundle = %bundle,
                        domain = %id,
                        "dropping unknown default domain"
                    );
                }
                known
            })
            .collect()
    }
}

impl std::fmt::Debug for BundleSettingsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleSettingsForm")
            .field("mapper", &self.mapper)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryEntityKindRegistry, MemoryFieldStore, StaticDomainRegistry};
    use pretty_assertions::assert_eq;

    struct Admin(bool);

    impl AccountProxy for Admin {
        fn has_permission(&self, permission: &str) -> bool {
            self.0 && permission == ADMINISTER_DOMAINS
        }
    }

    struct Fixture {
        registry: Arc<MemoryEntityKindRegistry>,
        mapper: ScopingFieldMapper,
        form: BundleSettingsForm,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(
            MemoryEntityKindRegistry::new()
                .with_kind(
                    EntityKind::new("event", "Event")
                        .with_bundle("conference", "Conference")
                        .with_bundle("webinar", "Webinar"),
                )
                .with_kind(EntityKind::new("tag", "Tag")),
        );
        let store = Arc::new(MemoryFieldStore::new());
        let domains = Arc::new(
            StaticDomainRegistry::new()
                .with_domain("d1", "Domain one")
                .with_domain("d2", "Domain two"),
        );
        let mapper = ScopingFieldMapper::new(registry.clone(), store.clone(), store);
        let form = BundleSettingsForm::new(mapper.clone(), domains, registry.clone());
        Fixture {
            registry,
            mapper,
            form,
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_selected() {
        let raw = strings(&["", "d2", "0", "d1", "false", " ", "d2"]);
        assert_eq!(filter_selected(&raw), strings(&["d2", "d1"]));
        assert!(filter_selected(&[]).is_empty());
    }

    #[test]
    fn test_disabled_kind_is_not_found() {
        let f = fixture();
        let err = f.form.check_access("event", &Admin(true)).unwrap_err();
        assert!(matches!(err, Error::KindNotEnabled(_)));
        assert!(err.is_not_found());
        assert!(f.form.build("event").unwrap_err().is_not_found());
        assert!(f
            .form
            .submit("event", &BundleSettingsSubmission::new())
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_unknown_kind_is_not_found() {
        let f = fixture();
        let err = f.form.check_access("ghost", &Admin(true)).unwrap_err();
        assert!(matches!(err, Error::KindNotFound(_)));
    }

    #[test]
    fn test_access_requires_permission() {
        let f = fixture();
        f.mapper.create_field_storage("event").unwrap();

        assert!(f.form.check_access("event", &Admin(true)).is_ok());
        let err = f.form.check_access("event", &Admin(false)).unwrap_err();
        assert!(matches!(err, Error::AccessDenied(_)));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_title() {
        let f = fixture();
        assert_eq!(
            f.form.title("event").unwrap(),
            "Activate domain access on Event (event)"
        );
    }

    #[test]
    fn test_build_fresh_kind() {
        let f = fixture();
        f.mapper.create_field_storage("event").unwrap();

        let view = f.form.build("event").unwrap();
        assert_eq!(view.bundles.len(), 2);
        assert!(view.bundles.iter().all(|b| !b.enabled && !b.open));
        assert!(view.bundles.iter().all(|b| b.behavior == Behavior::Auto));
        assert_eq!(view.domain_options[0].id, ACTIVE_DOMAIN_TOKEN);
        assert_eq!(view.domain_options.len(), 3);
        assert_eq!(view.behavior_options.len(), 2);
        assert!(view.message.is_none());
        assert!(view.warning.is_none());
    }

    #[test]
    fn test_build_without_bundles() {
        let f = fixture();
        f.mapper.create_field_storage("tag").unwrap();

        let view = f.form.build("tag").unwrap();
        assert!(view.bundles.is_empty());
        assert_eq!(
            view.message.as_deref(),
            Some("Entity Tag (tag) has no bundles yet.")
        );
    }

    #[test]
    fn test_two_step_attach_then_customize() {
        let f = fixture();
        f.mapper.create_field_storage("event").unwrap();
        let submission = BundleSettingsSubmission::new().with_bundle(
            "conference",
            BundleSubmission::enabled(Behavior::User, ["d1"]),
        );

        let outcomes = f.form.submit("event", &submission).unwrap();
        assert_eq!(
            outcomes,
            vec![
                BundleOutcome::Attached("conference".into()),
                BundleOutcome::Unchanged("webinar".into()),
            ]
        );
        let config = f
            .mapper
            .load_field_config("event", "conference")
            .unwrap()
            .unwrap();
        assert_eq!(config.behavior, Behavior::Auto);
        assert!(config.default_domains.is_empty());

        let outcomes = f.form.submit("event", &submission).unwrap();
        assert_eq!(outcomes[0], BundleOutcome::Updated("conference".into()));
        let config = f
            .mapper
            .load_field_config("event", "conference")
            .unwrap()
            .unwrap();
        assert_eq!(config.behavior, Behavior::User);
        assert_eq!(config.default_domains, strings(&["d1"]));
    }

    #[test]
    fn test_submit_filters_domains() {
        let f = fixture();
        f.mapper.add_domain_field("event", "webinar").unwrap();

        let submission = BundleSettingsSubmission::new().with_bundle(
            "webinar",
            BundleSubmission::enabled(
                Behavior::Auto,
                ["", "d2", "0", "gone", ACTIVE_DOMAIN_TOKEN, "d1"],
            ),
        );
        f.form.submit("event", &submission).unwrap();

        let config = f
            .mapper
            .load_field_config("event", "webinar")
            .unwrap()
            .unwrap();
        assert_eq!(
            config.default_domains,
            strings(&["d2", ACTIVE_DOMAIN_TOKEN, "d1"])
        );
    }

    #[test]
    fn test_unchecked_bundle_removed() {
        let f = fixture();
        f.mapper.add_domain_field("event", "conference").unwrap();
        f.mapper.add_domain_field("event", "webinar").unwrap();

        let submission = BundleSettingsSubmission::new()
            .with_bundle("conference", BundleSubmission::disabled())
            .with_bundle("webinar", BundleSubmission::enabled(Behavior::Auto, ["d1"]))
            .with_bundle("retired", BundleSubmission::enabled(Behavior::User, ["d1"]));

        let outcomes = f.form.submit("event", &submission).unwrap();
        assert_eq!(
            outcomes,
            vec![
                BundleOutcome::Removed("conference".into()),
                BundleOutcome::Updated("webinar".into()),
            ]
        );
        assert!(f
            .mapper
            .load_field_config("event", "conference")
            .unwrap()
            .is_none());
        assert!(f.mapper.load_field_storage("event").unwrap().is_some());
    }

    #[test]
    fn test_stale_domains_shown_unselected() {
        let f = fixture();
        f.mapper.add_domain_field("event", "conference").unwrap();
        f.mapper
            .update_field_settings("event", "conference", Behavior::User, strings(&["d1", "deleted"]))
            .unwrap();

        let view = f.form.build("event").unwrap();
        let conference = view.bundles.iter().find(|b| b.id == "conference").unwrap();
        assert!(conference.enabled && conference.open);
        assert_eq!(conference.behavior, Behavior::User);
        assert_eq!(conference.default_domains, strings(&["d1"]));
    }

    #[test]
    fn test_existing_content_warning() {
        let f = fixture();
        f.mapper.create_field_storage("event").unwrap();
        f.registry.set_instance_count("event", 12);

        assert!(f.form.build("event").unwrap().warning.is_none());

        f.mapper.add_domain_field("event", "webinar").unwrap();
        assert_eq!(
            f.form.build("event").unwrap().warning.as_deref(),
            Some(EXISTING_CONTENT_WARNING)
        );
    }

    #[test]
    fn test_build_uses_title() {
        let f = fixture();
        f.mapper.create_field_storage("event").unwrap();
        assert_eq!(f.form.build("event").unwrap().title, f.form.title("event").unwrap());
    }

    struct CountingDomains {
        inner: StaticDomainRegistry,
        lists: std::sync::atomic::AtomicUsize,
    }

    impl DomainRegistry for CountingDomains {
        fn options_list(&self) -> Vec<DomainOption> {
            self.lists
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.inner.options_list()
        }
    }

    #[test]
    fn test_domain_list_read_once_per_bundle() {
        let f = fixture();
        let domains = Arc::new(CountingDomains {
            inner: StaticDomainRegistry::new()
                .with_domain("d1", "Domain one")
                .with_domain("d2", "Domain two"),
            lists: std::sync::atomic::AtomicUsize::new(0),
        });
        let form = BundleSettingsForm::new(f.mapper.clone(), domains.clone(), f.registry.clone());
        f.mapper.add_domain_field("event", "webinar").unwrap();

        let submission = BundleSettingsSubmission::new().with_bundle(
            "webinar",
            BundleSubmission::enabled(Behavior::User, ["d1", "d2", "d3", "d1", "d4"]),
        );
        form.submit("event", &submission).unwrap();

        assert_eq!(domains.lists.load(std::sync::atomic::Ordering::SeqCst), 1);
        let config = f
            .mapper
            .load_field_config("event", "webinar")
            .unwrap()
            .unwrap();
        assert_eq!(config.default_domains, strings(&["d1", "d2"]));
    }
}

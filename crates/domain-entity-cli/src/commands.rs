//! Command definitions and execution.

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::formatter::Formatter;
use crate::manifest::Manifest;
use clap::Subcommand;
use domain_entity_core::{
    allowed_entity_types, AccountProxy, Behavior, BundleSettingsForm, BundleSettingsSubmission,
    BundleSubmission, EntityTypesForm, EntityTypesSubmission, ScopingFieldMapper,
    SledFieldStore, ADMINISTER_DOMAINS,
};
use std::sync::Arc;

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List fieldable entity kinds and whether domain access is enabled.
    ListTypes,

    /// Enable domain access on exactly the given kinds.
    ///
    /// Enabled kinds that are not listed are disabled, which deletes their
    /// field storage and every bundle field.
    ApplyTypes {
        /// Kind to enable (repeatable).
        #[arg(long)]
        enable: Vec<String>,

        /// Turn off domain access conditions for all kinds.
        #[arg(long)]
        bypass: bool,
    },

    /// Show the bundle settings of an enabled kind.
    ShowBundles {
        /// Entity kind id.
        kind: String,
    },

    /// Apply bundle settings of an enabled kind.
    ///
    /// Bundles that are not listed lose the domain field. A newly attached
    /// bundle gets default settings; its behavior and domains are applied on
    /// the next run.
    ApplyBundles {
        /// Entity kind id.
        kind: String,

        /// Bundle to attach, as ID[=BEHAVIOR[:D1,D2]] (repeatable).
        #[arg(long = "bundle", value_parser = parse_bundle_arg)]
        bundles: Vec<BundleArg>,
    },

    /// Show the bundles scoped by domain, per enabled kind.
    Allowed,
}

/// A `--bundle` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleArg {
    /// Bundle id.
    pub id: String,
    /// Submitted values.
    pub values: BundleSubmission,
}

/// Parse `ID[=BEHAVIOR[:D1,D2]]`.
pub fn parse_bundle_arg(raw: &str) -> Result<BundleArg, String> {
    let (id, rest) = match raw.split_once('=') {
        Some((id, rest)) => (id.trim(), Some(rest)),
        None => (raw.trim(), None),
    };
    if id.is_empty() {
        return Err(format!("missing bundle id in '{}'", raw));
    }

    let (behavior, domains) = match rest {
        None => (Behavior::default(), Vec::new()),
        Some(rest) => {
            let (behavior, domains) = match rest.split_once(':') {
                Some((b, d)) => (b, d.split(',').map(|s| s.trim().to_string()).collect()),
                None => (rest, Vec::new()),
            };
            (behavior.trim().parse::<Behavior>()?, domains)
        }
    };

    Ok(BundleArg {
        id: id.to_string(),
        values: BundleSubmission::enabled(behavior, domains),
    })
}

/// The operator running the CLI administers domains.
struct Operator;

impl AccountProxy for Operator {
    fn has_permission(&self, permission: &str) -> bool {
        permission == ADMINISTER_DOMAINS
    }
}

/// Forms wired to a sled database and a host manifest.
pub struct App {
    mapper: ScopingFieldMapper,
    types_form: EntityTypesForm,
    bundle_form: BundleSettingsForm,
    store: Arc<SledFieldStore>,
}

impl App {
    /// Open the database and manifest named by the configuration.
    pub fn open(config: &CliConfig) -> CliResult<Self> {
        let manifest = Manifest::load(&config.manifest_path)?;
        let db = sled::open(&config.data_path)?;
        tracing::debug!(data_path = %config.data_path.display(), "database opened");
        Self::new(&db, &manifest)
    }

    /// Wire the forms over an open database.
    pub fn new(db: &sled::Db, manifest: &Manifest) -> CliResult<Self> {
        let store = Arc::new(SledFieldStore::open(db)?);
        let registry = Arc::new(manifest.registry());
        let mapper = ScopingFieldMapper::new(registry.clone(), store.clone(), store.clone());
        let types_form = EntityTypesForm::new(mapper.clone(), store.clone());
        let bundle_form =
            BundleSettingsForm::new(mapper.clone(), Arc::new(manifest.domain_registry()), registry);

        Ok(Self {
            mapper,
            types_form,
            bundle_form,
            store,
        })
    }

    /// Run a command and render its result.
    pub fn execute(&self, command: &Command, formatter: &dyn Formatter) -> CliResult<String> {
        let output = match command {
            Command::ListTypes => formatter.format_entity_types(&self.types_form.build()?),

            Command::ApplyTypes { enable, bypass } => {
                let submission = enable
                    .iter()
                    .fold(EntityTypesSubmission::new(), |s, kind| s.with_checked(kind.as_str()))
                    .with_bypass(*bypass);
                let delta = self.types_form.submit(&submission)?;
                formatter.format_delta(&delta)
            }

            Command::ShowBundles { kind } => {
                self.bundle_form.check_access(kind, &Operator)?;
                formatter.format_bundles(&self.bundle_form.build(kind)?)
            }

            Command::ApplyBundles { kind, bundles } => {
                self.bundle_form.check_access(kind, &Operator)?;
                let known = self.mapper.registry().bundle_info(kind);
                if let Some(unknown) = bundles.iter().find(|b| !known.contains_key(&b.id)) {
                    return Err(CliError::InvalidArgument(format!(
                        "entity kind '{}' has no bundle '{}'",
                        kind, unknown.id
                    )));
                }

                let submission = bundles
                    .iter()
                    .fold(BundleSettingsSubmission::new(), |s, b| {
                        s.with_bundle(b.id.as_str(), b.values.clone())
                    });
                formatter.format_outcomes(&self.bundle_form.submit(kind, &submission)?)
            }

            Command::Allowed => formatter.format_allowed(&allowed_entity_types(&self.mapper, &[])?),
        };

        self.store.flush()?;
        Ok(output)
    }
}

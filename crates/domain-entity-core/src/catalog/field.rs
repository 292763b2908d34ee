//! Scoping field storage and per-bundle field config records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reserved name of the domain access field.
pub const FIELD_NAME: &str = "domain_access";

/// Field type of the domain access field.
pub const FIELD_TYPE: &str = "entity_reference";

/// Entity kind referenced by the domain access field.
pub const DOMAIN_TARGET_KIND: &str = "domain";

/// Label given to newly attached field configs.
pub const FIELD_LABEL: &str = "Domain Access";

/// Description given to newly attached field configs.
pub const FIELD_DESCRIPTION: &str =
    "Select the affiliate domain(s). If nothing was selected: Affiliated to all domains.";

/// Default-domains entry that resolves to the current domain at creation time.
pub const ACTIVE_DOMAIN_TOKEN: &str = "domain_active";

/// Identifier of the field storage for an entity kind.
pub fn storage_id(entity_kind: &str) -> String {
    format!("{}.{}", entity_kind, FIELD_NAME)
}

/// Identifier of the field config for a bundle.
pub fn config_id(entity_kind: &str, bundle: &str) -> String {
    format!("{}.{}.{}", entity_kind, bundle, FIELD_NAME)
}

/// How a bundle's entities get their domain affiliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Behavior {
    /// Assigned automatically from the defaults, no widget on the creation form.
    #[default]
    Auto,
    /// Chosen by the user on the creation form, prefilled from the defaults.
    User,
}

impl Behavior {
    /// All behaviors in display order.
    pub const ALL: [Behavior; 2] = [Behavior::Auto, Behavior::User];

    /// Machine name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Behavior::Auto => "auto",
            Behavior::User => "user",
        }
    }

    /// Option text shown on the bundle settings screen.
    pub fn description(&self) -> &'static str {
        match self {
            Behavior::Auto => {
                "Affiliate automatically created entity to a value (no widget on entity creation form, auto-assignation)"
            }
            Behavior::User => {
                "User choose affiliate, with a default value (form widget on the entity creation form)"
            }
        }
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Behavior {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Behavior::Auto),
            "user" => Ok(Behavior::User),
            other => Err(format!("unknown behavior '{}', expected auto or user", other)),
        }
    }
}

/// Number of values a field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cardinality {
    /// Any number of values.
    Unlimited,
}

/// Where a new entity's field value comes from when none is submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefaultValueSource {
    /// Resolve from the bundle defaults and the current domain at creation time.
    #[default]
    CurrentDomain,
}

/// Marks an entity kind as enabled for domain scoping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopingFieldStorage {
    /// Owning entity kind.
    pub entity_kind: String,
    /// Field name, always [`FIELD_NAME`].
    pub field_name: String,
    /// Field type, always [`FIELD_TYPE`].
    pub field_type: String,
    /// Referenced entity kind.
    pub target_kind: String,
    /// Value cardinality.
    pub cardinality: Cardinality,
    /// Locked storages cannot be removed.
    pub locked: bool,
    /// Keep the storage even when no bundle uses it.
    pub persist_with_no_fields: bool,
}

impl ScopingFieldStorage {
    /// Storage definition for an entity kind.
    pub fn for_kind(entity_kind: impl Into<String>) -> Self {
        Self {
            entity_kind: entity_kind.into(),
            field_name: FIELD_NAME.to_string(),
            field_type: FIELD_TYPE.to_string(),
            target_kind: DOMAIN_TARGET_KIND.to_string(),
            cardinality: Cardinality::Unlimited,
            locked: false,
            persist_with_no_fields: true,
        }
    }

    /// Composite identifier `{kind}.{field}`.
    pub fn id(&self) -> String {
        format!("{}.{}", self.entity_kind, self.field_name)
    }
}

/// Attaches the domain access field to one bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopingFieldConfig {
    /// Owning entity kind.
    pub entity_kind: String,
    /// Bundle carrying the field.
    pub bundle: String,
    /// Field name, always [`FIELD_NAME`].
    pub field_name: String,
    /// Field label.
    pub label: String,
    /// Help text.
    pub description: String,
    /// Whether a value is required on entity forms.
    pub required: bool,
    /// Default value source for new entities.
    pub default_value: DefaultValueSource,
    /// Assignment behavior.
    #[serde(default)]
    pub behavior: Behavior,
    /// Default domain ids in selection order. Empty means all domains.
    #[serde(default)]
    pub default_domains: Vec<String>,
}

impl ScopingFieldConfig {
    /// Field config with the default settings.
    pub fn new(entity_kind: impl Into<String>, bundle: impl Into<String>) -> Self {
        Self {
            entity_kind: entity_kind.into(),
            bundle: bundle.into(),
            field_name: FIELD_NAME.to_string(),
            label: FIELD_LABEL.to_string(),
            description: FIELD_DESCRIPTION.to_string(),
            required: false,
            default_value: DefaultValueSource::CurrentDomain,
            behavior: Behavior::Auto,
            default_domains: Vec::new(),
        }
    }

    /// Set the behavior.
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Set the default domains.
    pub fn with_default_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Composite identifier `{kind}.{bundle}.{field}`.
    pub fn id(&self) -> String {
        format!("{}.{}.{}", self.entity_kind, self.bundle, self.field_name)
    }

    /// Identifier of the storage this config belongs to.
    pub fn storage_id(&self) -> String {
        format!("{}.{}", self.entity_kind, self.field_name)
    }

    /// Whether new entities are affiliated to every domain by default.
    pub fn is_unscoped(&self) -> bool {
        self.default_domains.is_empty()
    }
}

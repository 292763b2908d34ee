//! Output formatters for command results.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use domain_entity_core::{
    AllowedEntityTypes, BundleOutcome, BundleSettingsView, EntityTypesView, KindDelta,
};
use serde::Serialize;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format the entity kind overview.
    fn format_entity_types(&self, view: &EntityTypesView) -> String;

    /// Format an applied enable/disable delta.
    fn format_delta(&self, delta: &KindDelta) -> String;

    /// Format the bundle settings of one kind.
    fn format_bundles(&self, view: &BundleSettingsView) -> String;

    /// Format per-bundle results of a submission.
    fn format_outcomes(&self, outcomes: &[BundleOutcome]) -> String;

    /// Format the allowed entity kinds.
    fn format_allowed(&self, allowed: &AllowedEntityTypes) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_entity_types(&self, view: &EntityTypesView) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Entity kind", "Label", "Enabled", "Settings"]);

        for row in &view.rows {
            table.add_row(vec![
                Cell::new(&row.id),
                Cell::new(&row.label),
                Cell::new(yes_no(row.enabled)),
                Cell::new(row.configure_route.as_deref().unwrap_or("")),
            ]);
        }

        format!(
            "{}\nBypass access conditions: {}",
            table,
            yes_no(view.bypass_access_conditions)
        )
    }

    fn format_delta(&self, delta: &KindDelta) -> String {
        if delta.is_empty() {
            return "No changes".to_string();
        }

        let mut table = Table::new();
        table.set_header(vec!["Entity kind", "Change"]);
        for kind in &delta.create {
            table.add_row(vec![kind.as_str(), "enabled"]);
        }
        for kind in &delta.delete {
            table.add_row(vec![kind.as_str(), "disabled"]);
        }
        format!("{}\n{} change(s) applied", table, delta.change_count())
    }

    fn format_bundles(&self, view: &BundleSettingsView) -> String {
        let mut output = view.title.clone();

        if let Some(message) = &view.message {
            output.push('\n');
            output.push_str(message);
            return output;
        }

        let mut table = Table::new();
        table.set_header(vec!["Bundle", "Label", "Enabled", "Behavior", "Default domains"]);
        for bundle in &view.bundles {
            let (behavior, domains) = if bundle.enabled {
                (bundle.behavior.to_string(), bundle.default_domains.join(", "))
            } else {
                (String::new(), String::new())
            };
            table.add_row(vec![
                Cell::new(&bundle.id),
                Cell::new(&bundle.label),
                Cell::new(yes_no(bundle.enabled)),
                Cell::new(behavior),
                Cell::new(domains),
            ]);
        }
        output.push('\n');
        output.push_str(&table.to_string());

        if let Some(warning) = &view.warning {
            output.push_str("\nWarning: ");
            output.push_str(warning);
        }
        output
    }

    fn format_outcomes(&self, outcomes: &[BundleOutcome]) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Bundle", "Result"]);
        for outcome in outcomes {
            let (bundle, result) = match outcome {
                BundleOutcome::Attached(b) => (b, "attached"),
                BundleOutcome::Updated(b) => (b, "updated"),
                BundleOutcome::Removed(b) => (b, "removed"),
                BundleOutcome::Unchanged(b) => (b, "unchanged"),
            };
            table.add_row(vec![bundle.as_str(), result]);
        }

        let attached = outcomes
            .iter()
            .any(|o| matches!(o, BundleOutcome::Attached(_)));
        if attached {
            format!(
                "{}\nNewly attached bundles use default settings; run again to apply behavior and domains.",
                table
            )
        } else {
            table.to_string()
        }
    }

    fn format_allowed(&self, allowed: &AllowedEntityTypes) -> String {
        if allowed.is_empty() {
            return "No entity kinds are scoped by domain".to_string();
        }

        let mut table = Table::new();
        table.set_header(vec!["Entity kind", "Bundle", "Behavior", "Default domains"]);
        for (kind, bundles) in allowed {
            for (bundle, scope) in bundles {
                table.add_row(vec![
                    Cell::new(kind),
                    Cell::new(bundle),
                    Cell::new(scope.behavior),
                    Cell::new(scope.default_domains.join(", ")),
                ]);
            }
        }
        table.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl JsonFormatter {
    fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
    }
}

impl Formatter for JsonFormatter {
    fn format_entity_types(&self, view: &EntityTypesView) -> String {
        Self::to_json(view)
    }

    fn format_delta(&self, delta: &KindDelta) -> String {
        Self::to_json(delta)
    }

    fn format_bundles(&self, view: &BundleSettingsView) -> String {
        Self::to_json(view)
    }

    fn format_outcomes(&self, outcomes: &[BundleOutcome]) -> String {
        Self::to_json(outcomes)
    }

    fn format_allowed(&self, allowed: &AllowedEntityTypes) -> String {
        Self::to_json(allowed)
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

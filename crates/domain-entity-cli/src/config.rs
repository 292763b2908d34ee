//! CLI configuration.

use crate::commands::Command;
use crate::formatter::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Default database directory.
pub const DEFAULT_DATA_PATH: &str = "./data";

/// Default host manifest.
pub const DEFAULT_MANIFEST_PATH: &str = "./domain-entity.json";

/// Resolved CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Path to the sled database holding field records and settings.
    pub data_path: PathBuf,

    /// Path to the JSON manifest describing entity kinds and domains.
    pub manifest_path: PathBuf,

    /// Output format.
    pub format: OutputFormat,
}

impl CliConfig {
    /// Create a configuration with the given data path.
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
            format: OutputFormat::Table,
        }
    }

    /// Set the manifest path.
    pub fn with_manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = path.into();
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_PATH)
    }
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "domain-entity")]
#[command(version, about = "Domain access configuration for entity kinds", long_about = None)]
pub struct Args {
    /// Path to the database directory.
    #[arg(short, long, global = true, default_value = DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Path to the host manifest.
    #[arg(short, long, global = true, default_value = DEFAULT_MANIFEST_PATH)]
    pub manifest: PathBuf,

    /// Output format.
    #[arg(long, global = true, default_value = "table", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Split the arguments into the configuration and the command to run.
    pub fn into_parts(self) -> (CliConfig, Command) {
        let config = CliConfig {
            data_path: self.data_path,
            manifest_path: self.manifest,
            format: self.format,
        };
        (config, self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.data_path, PathBuf::from("./data"));
        assert_eq!(config.manifest_path, PathBuf::from("./domain-entity.json"));
        assert_eq!(config.format, OutputFormat::Table);
    }

    #[test]
    fn test_config_builder() {
        let config = CliConfig::new("/var/lib/domain-entity")
            .with_manifest_path("/etc/domain-entity.json")
            .with_format(OutputFormat::Json);

        assert_eq!(config.data_path, PathBuf::from("/var/lib/domain-entity"));
        assert_eq!(config.manifest_path, PathBuf::from("/etc/domain-entity.json"));
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_args_into_parts() {
        let args = Args::parse_from([
            "domain-entity",
            "--format",
            "json",
            "show-bundles",
            "event",
            "-d",
            "/tmp/db",
        ]);
        let (config, command) = args.into_parts();

        assert_eq!(config.data_path, PathBuf::from("/tmp/db"));
        assert_eq!(config.manifest_path, PathBuf::from(DEFAULT_MANIFEST_PATH));
        assert_eq!(config.format, OutputFormat::Json);
        assert!(matches!(command, Command::ShowBundles { ref kind } if kind == "event"));
    }

    #[test]
    fn test_args_apply_types() {
        let args = Args::parse_from([
            "domain-entity",
            "apply-types",
            "--enable",
            "node",
            "--enable",
            "event",
            "--bypass",
        ]);
        match args.into_parts().1 {
            Command::ApplyTypes { enable, bypass } => {
                assert_eq!(enable, vec!["node", "event"]);
                assert!(bypass);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

//! CLI error types.

use thiserror::Error;

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Unknown or disabled entity kind, unknown bundle, or missing permission.
    #[error("not found: {0}")]
    NotFound(domain_entity_core::Error),

    /// Any other error from the field mapper or the settings forms.
    #[error(transparent)]
    Core(domain_entity_core::Error),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sled::Error),

    /// Manifest could not be read or parsed.
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Invalid command-line value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound(_) => 2,
            _ => 1,
        }
    }
}

impl From<domain_entity_core::Error> for CliError {
    fn from(err: domain_entity_core::Error) -> Self {
        if err.is_not_found() {
            CliError::NotFound(err)
        } else {
            CliError::Core(err)
        }
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = std::result::Result<T, CliError>;

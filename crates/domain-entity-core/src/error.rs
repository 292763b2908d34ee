//! Core error types.

use thiserror::Error;

/// Errors raised by the mapper, the settings forms, and the stores.
#[derive(Debug, Error)]
pub enum Error {
    /// The host platform does not know this entity kind.
    #[error("entity kind not found: {0}")]
    KindNotFound(String),

    /// The entity kind has no such bundle.
    #[error("bundle not found: {kind}.{bundle}")]
    BundleNotFound {
        /// Owning entity kind.
        kind: String,
        /// Requested bundle.
        bundle: String,
    },

    /// The entity kind exists but has no scoping field storage.
    #[error("domain access is not enabled for entity kind: {0}")]
    KindNotEnabled(String),

    /// The caller lacks the administrative permission.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// Underlying sled error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// Record encoding error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Failure reported by a host persistence layer.
    #[error("persistence error: {0}")]
    Persistence(String),
}

impl Error {
    /// Whether the error is surfaced to administrators as a not-found response.
    ///
    /// Permission failures on the per-kind settings screen are reported the
    /// same way as unknown or disabled kinds.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::KindNotFound(_)
                | Error::BundleNotFound { .. }
                | Error::KindNotEnabled(_)
                | Error::AccessDenied(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::BundleNotFound {
            kind: "event".to_string(),
            bundle: "webinar".to_string(),
        };
        assert_eq!(err.to_string(), "bundle not found: event.webinar");

        let err = Error::KindNotEnabled("order".to_string());
        assert!(err.to_string().contains("order"));
    }

    #[test]
    fn test_not_found_family() {
        assert!(Error::KindNotFound("x".into()).is_not_found());
        assert!(Error::KindNotEnabled("x".into()).is_not_found());
        assert!(Error::AccessDenied("x".into()).is_not_found());
        assert!(!Error::Persistence("disk full".into()).is_not_found());
        assert!(!Error::Serialization("bad".into()).is_not_found());
    }
}

//! Error handling for saml-bridge configuration.
//!
//! These errors are raised while the system is being assembled (loading
//! configuration, metadata or key material). Per-message faults never use this
//! type; they are reported as validation results by the protocol crate.
//!
//! Error messages name the offending setting but never echo secret values.

use thiserror::Error;

/// Result type alias using the core error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration-time error.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required metadata entry is absent.
    #[error("metadata error: {0}")]
    Metadata(String),

    /// Key material could not be loaded.
    #[error("key material error: {0}")]
    KeyMaterial(String),

    /// I/O error while reading configuration sources.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Returns whether this error came from an operator-supplied setting.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::KeyMaterial(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_setting() {
        let error = Error::Config("SB_REPLAY_WINDOW_MINUTES must be a number".to_string());
        assert_eq!(
            error.to_string(),
            "configuration error: SB_REPLAY_WINDOW_MINUTES must be a number"
        );
        assert!(error.is_configuration());
    }

    #[test]
    fn metadata_error_is_not_operator_setting() {
        let error = Error::Metadata("no entity descriptor for https://sp.example.com".to_string());
        assert!(!error.is_configuration());
    }
}

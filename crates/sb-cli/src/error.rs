//! CLI error types.

use thiserror::Error;

/// CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Key store description is unusable.
    #[error("key store error: {0}")]
    KeyStore(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The payload was rejected.
    #[error("{code}: {details}")]
    Rejected {
        /// Failure code.
        code: &'static str,
        /// What was wrong.
        details: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// SAML error.
    #[error(transparent)]
    Saml(#[from] sb_protocol_saml::SamlError),

    /// Crypto error.
    #[error(transparent)]
    Crypto(#[from] sb_crypto::CryptoError),
}

impl From<sb_core::Error> for CliError {
    fn from(err: sb_core::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<sb_protocol_saml::ValidationFailure> for CliError {
    fn from(failure: sb_protocol_saml::ValidationFailure) -> Self {
        Self::Rejected {
            code: failure.code(),
            details: failure.details,
        }
    }
}

/// CLI result type.
pub type CliResult<T> = Result<T, CliError>;

//! SAML error types.
//!
//! [`SamlError`] covers configuration-time faults (unknown partners, missing
//! endpoints, unusable key material) and the codec/crypto faults raised while
//! handling one message. The facades never hand per-message errors back as
//! `Err`: they fold them into a [`ValidationFailure`] via
//! [`SamlError::failure_kind`].
//!
//! [`ValidationFailure`]: crate::validation::ValidationFailure

use thiserror::Error;

use crate::validation::ValidationErrorKind;

/// Result type for SAML operations.
pub type SamlResult<T> = Result<T, SamlError>;

/// SAML protocol errors.
#[derive(Debug, Error)]
pub enum SamlError {
    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// XML serialization error.
    #[error("XML serialization error: {0}")]
    XmlSerialize(String),

    /// Base64 decoding error.
    #[error("base64 decode error: {0}")]
    Base64Decode(String),

    /// XML signature validation failed.
    #[error("signature validation failed: {0}")]
    SignatureInvalid(String),

    /// XML signature creation failed.
    #[error("signature creation failed: {0}")]
    SignatureCreation(String),

    /// Assertion encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Assertion decryption failed.
    #[error("assertion decryption failed")]
    Decryption,

    /// No metadata for the service provider.
    #[error("unknown service provider: {0}")]
    UnknownServiceProvider(String),

    /// No metadata for the identity provider.
    #[error("unknown identity provider: {0}")]
    UnknownIdentityProvider(String),

    /// Metadata lists no endpoint for the binding.
    #[error("no {binding} endpoint for {entity_id}")]
    MissingEndpoint {
        /// Entity whose endpoint was requested.
        entity_id: String,
        /// Binding name.
        binding: &'static str,
    },

    /// Algorithm not supported.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Unsupported or unparseable SAML version.
    #[error("unsupported SAML version: {0}")]
    UnsupportedVersion(String),

    /// Metadata could not be loaded or is inconsistent.
    #[error("metadata error: {0}")]
    Metadata(String),

    /// Key material is configured but unusable.
    #[error("key material error: {0}")]
    KeyMaterial(String),

    /// Cryptographic primitive failure.
    #[error(transparent)]
    Crypto(#[from] sb_crypto::CryptoError),

    /// Strategy registry failure.
    #[error(transparent)]
    Strategy(#[from] sb_spi::SpiError),

    /// Configuration error.
    #[error(transparent)]
    Config(#[from] sb_core::Error),
}

impl SamlError {
    /// Returns true for faults that should stop startup rather than fail one message.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownServiceProvider(_)
                | Self::UnknownIdentityProvider(_)
                | Self::MissingEndpoint { .. }
                | Self::UnsupportedAlgorithm(_)
                | Self::Metadata(_)
                | Self::KeyMaterial(_)
                | Self::Strategy(_)
                | Self::Config(_)
        )
    }

    /// Maps a per-message fault onto the validation failure it is reported as.
    #[must_use]
    pub const fn failure_kind(&self) -> ValidationErrorKind {
        match self {
            Self::SignatureInvalid(_) => ValidationErrorKind::Signature,
            Self::Decryption => ValidationErrorKind::Decryption,
            Self::UnsupportedVersion(_) => ValidationErrorKind::Version,
            _ => ValidationErrorKind::Unexpected,
        }
    }
}

impl From<quick_xml::DeError> for SamlError {
    fn from(err: quick_xml::DeError) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<base64::DecodeError> for SamlError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64Decode(err.to_string())
    }
}

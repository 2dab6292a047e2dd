//! Validation outcomes.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a message was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// Protocol major version differs from the validator's.
    #[serde(rename = "VERSION_ERROR")]
    Version,
    /// Issuer missing or not the expected entity.
    #[serde(rename = "ISSUER_ERROR")]
    Issuer,
    /// Validity window incomplete.
    #[serde(rename = "MISSING_TIMEFRAME_ERROR")]
    MissingTimeframe,
    /// Current time outside the validity window.
    #[serde(rename = "INVALID_TIMEFRAME_ERROR")]
    InvalidTimeframe,
    /// No usable subject identity.
    #[serde(rename = "MISSING_SUBJECT_ERROR")]
    MissingSubject,
    /// Response identifier already seen within the replay window.
    #[serde(rename = "REPLAY_ERROR")]
    Replay,
    /// Internal fault while validating.
    #[serde(rename = "UNEXPECTED_ERROR")]
    Unexpected,
    /// Signature missing or not trusted.
    #[serde(rename = "SIGNATURE_ERROR")]
    Signature,
    /// Encrypted assertion could not be decrypted.
    #[serde(rename = "DECRYPTION_ERROR")]
    Decryption,
    /// Response status is not success.
    #[serde(rename = "STATUS_ERROR")]
    Status,
    /// `InResponseTo` does not match the outstanding request.
    #[serde(rename = "CORRELATION_ERROR")]
    Correlation,
}

impl ValidationErrorKind {
    /// The audit code for this kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Version => "VERSION_ERROR",
            Self::Issuer => "ISSUER_ERROR",
            Self::MissingTimeframe => "MISSING_TIMEFRAME_ERROR",
            Self::InvalidTimeframe => "INVALID_TIMEFRAME_ERROR",
            Self::MissingSubject => "MISSING_SUBJECT_ERROR",
            Self::Replay => "REPLAY_ERROR",
            Self::Unexpected => "UNEXPECTED_ERROR",
            Self::Signature => "SIGNATURE_ERROR",
            Self::Decryption => "DECRYPTION_ERROR",
            Self::Status => "STATUS_ERROR",
            Self::Correlation => "CORRELATION_ERROR",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A rejected message: the kind plus human-readable details.
///
/// Details name identifiers and settings, never key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {details}")]
pub struct ValidationFailure {
    /// Failure kind.
    pub kind: ValidationErrorKind,
    /// What was wrong.
    pub details: String,
}

impl ValidationFailure {
    /// Creates a failure.
    #[must_use]
    pub fn new(kind: ValidationErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            details: details.into(),
        }
    }

    /// The audit code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// Outcome of a validation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Accepted.
    Valid,
    /// Rejected.
    Invalid(ValidationFailure),
}

impl ValidationResult {
    /// A rejection.
    #[must_use]
    pub fn invalid(kind: ValidationErrorKind, details: impl Into<String>) -> Self {
        Self::Invalid(ValidationFailure::new(kind, details))
    }

    /// Returns true if accepted.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The failure, if rejected.
    #[must_use]
    pub const fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Valid => None,
            Self::Invalid(failure) => Some(failure),
        }
    }

    /// The failure kind, if rejected.
    #[must_use]
    pub fn error_kind(&self) -> Option<ValidationErrorKind> {
        self.failure().map(|f| f.kind)
    }

    /// Converts into a `Result` so steps can be chained with `?`.
    ///
    /// # Errors
    ///
    /// Returns the failure if rejected.
    pub fn into_result(self) -> Result<(), ValidationFailure> {
        match self {
            Self::Valid => Ok(()),
            Self::Invalid(failure) => Err(failure),
        }
    }
}

impl From<Result<(), ValidationFailure>> for ValidationResult {
    fn from(result: Result<(), ValidationFailure>) -> Self {
        match result {
            Ok(()) => Self::Valid,
            Err(failure) => Self::Invalid(failure),
        }
    }
}

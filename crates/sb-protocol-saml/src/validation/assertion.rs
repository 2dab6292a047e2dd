//! Assertion validation.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. version major matches the validator's protocol
//! 2. issuer present and equal to the expected issuer
//! 3. `NotBefore` and `NotOnOrAfter` both present
//! 4. `NotBefore < now < NotOnOrAfter`
//! 5. a non-blank subject identity
//!
//! SAML 1.1 and 2.0 share the algorithm and differ only in where the issuer
//! and subject live, see [`ProtocolProfile`].

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::types::{Assertion, SamlVersion};

use super::{ValidationErrorKind, ValidationFailure, ValidationResult};

/// Where a protocol version keeps the issuer and subject of an assertion.
pub trait ProtocolProfile: Send + Sync + fmt::Debug + Default + 'static {
    /// Protocol version validated.
    const VERSION: SamlVersion;

    /// The issuer entity.
    fn issuer(assertion: &Assertion) -> Option<&str>;

    /// The subject identity.
    fn subject(assertion: &Assertion) -> Option<&str>;
}

/// SAML 1.1: the issuer is an attribute of `Assertion` and the subject is
/// carried by the statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Saml11Profile;

impl ProtocolProfile for Saml11Profile {
    const VERSION: SamlVersion = SamlVersion::V1_1;

    fn issuer(assertion: &Assertion) -> Option<&str> {
        assertion.issuer_attribute.as_deref()
    }

    fn subject(assertion: &Assertion) -> Option<&str> {
        assertion.statement_name_id().and_then(|id| id.non_blank_value())
    }
}

/// SAML 2.0: the subject is the assertion's own `Subject/NameID`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Saml20Profile;

impl ProtocolProfile for Saml20Profile {
    const VERSION: SamlVersion = SamlVersion::V2_0;

    fn issuer(assertion: &Assertion) -> Option<&str> {
        assertion.issuer.as_deref()
    }

    fn subject(assertion: &Assertion) -> Option<&str> {
        assertion.subject_name_id().and_then(|id| id.non_blank_value())
    }
}

/// Object-safe assertion validator, so partners can register their own.
///
/// Implementations report faults as `UNEXPECTED_ERROR` results. The consumer
/// still catches a panicking validator and rejects that message the same way.
pub trait Validator: Send + Sync + fmt::Debug {
    /// Protocol version this validator accepts.
    fn version(&self) -> SamlVersion;

    /// Validates `assertion` as of `now`.
    fn validate_at(
        &self,
        assertion: &Assertion,
        expected_issuer: &str,
        now: DateTime<Utc>,
    ) -> ValidationResult;

    /// Validates `assertion` as of the current time.
    fn validate(&self, assertion: &Assertion, expected_issuer: &str) -> ValidationResult {
        self.validate_at(assertion, expected_issuer, Utc::now())
    }
}

/// The standard validator for protocol profile `P`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssertionValidator<P> {
    _profile: PhantomData<P>,
}

/// SAML 1.1 assertion validator.
pub type Saml11AssertionValidator = AssertionValidator<Saml11Profile>;

/// SAML 2.0 assertion validator.
pub type Saml20AssertionValidator = AssertionValidator<Saml20Profile>;

impl<P: ProtocolProfile> AssertionValidator<P> {
    /// Creates the validator.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _profile: PhantomData,
        }
    }

    fn check(
        assertion: &Assertion,
        expected_issuer: &str,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationFailure> {
        let expected_major = P::VERSION.major();
        match SamlVersion::major_of(&assertion.version) {
            Some(major) if major == expected_major => {}
            _ => {
                return Err(ValidationFailure::new(
                    ValidationErrorKind::Version,
                    format!(
                        "assertion version '{}' is not SAML {expected_major}.x",
                        assertion.version
                    ),
                ));
            }
        }

        match P::issuer(assertion) {
            Some(issuer) if issuer == expected_issuer => {}
            Some(issuer) => {
                return Err(ValidationFailure::new(
                    ValidationErrorKind::Issuer,
                    format!("issuer '{issuer}' does not match expected issuer '{expected_issuer}'"),
                ));
            }
            None => {
                return Err(ValidationFailure::new(
                    ValidationErrorKind::Issuer,
                    format!("assertion has no issuer, expected '{expected_issuer}'"),
                ));
            }
        }

        let (Some(not_before), Some(not_on_or_after)) = assertion.validity_window() else {
            return Err(ValidationFailure::new(
                ValidationErrorKind::MissingTimeframe,
                "assertion must carry both NotBefore and NotOnOrAfter",
            ));
        };

        if !(not_before < now && now < not_on_or_after) {
            return Err(ValidationFailure::new(
                ValidationErrorKind::InvalidTimeframe,
                format!(
                    "current time {} is outside the validity window {} .. {}",
                    now.to_rfc3339(),
                    not_before.to_rfc3339(),
                    not_on_or_after.to_rfc3339()
                ),
            ));
        }

        if P::subject(assertion).is_none() {
            return Err(ValidationFailure::new(
                ValidationErrorKind::MissingSubject,
                "assertion has no subject identity",
            ));
        }

        Ok(())
    }
}

impl<P: ProtocolProfile> Validator for AssertionValidator<P> {
    fn version(&self) -> SamlVersion {
        P::VERSION
    }

    fn validate_at(
        &self,
        assertion: &Assertion,
        expected_issuer: &str,
        now: DateTime<Utc>,
    ) -> ValidationResult {
        let result = Self::check(assertion, expected_issuer, now);
        if let Err(failure) = &result {
            tracing::debug!(
                assertion_id = %assertion.id,
                protocol = %P::VERSION,
                code = failure.code(),
                "assertion rejected"
            );
        }
        result.into()
    }
}

/// The standard validator for `version`.
#[must_use]
pub fn validator_for(version: SamlVersion) -> Arc<dyn Validator> {
    match version {
        SamlVersion::V1_1 => Arc::new(Saml11AssertionValidator::new()),
        SamlVersion::V2_0 => Arc::new(Saml20AssertionValidator::new()),
    }
}

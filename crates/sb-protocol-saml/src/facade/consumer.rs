//! Inbound pipeline: decode, replay, signature, status, correlation,
//! decryption, assertion validation.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sb_core::config::Config;
use sb_core::KeyMaterial;
use sb_crypto::KeyStore;

use crate::audit::AuditContext;
use crate::encryption::decrypt_assertion;
use crate::error::SamlResult;
use crate::signature::{SignatureVerifier, SignedXml};
use crate::trust::InboundPolicy;
use crate::types::{Assertion, AttributeMap, Response, SamlVersion};
use crate::validation::{
    ProtocolProfile, ReplayGuard, Saml11Profile, Saml20Profile, SeenResponseLedger,
    ValidationErrorKind, ValidationFailure, ValidationResult, Validator,
};
use crate::wire;

use super::Partners;

/// Settings for a consumer.
#[derive(Debug, Clone, Default)]
pub struct ConsumerSettings {
    /// Protocol expected from identity providers.
    pub protocol: SamlVersion,
    /// Decryption key reference.
    pub decryption_key: KeyMaterial,
}

impl ConsumerSettings {
    /// Reads consumer settings from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the protocol is unknown.
    pub fn from_config(config: &Config) -> SamlResult<Self> {
        Ok(Self {
            protocol: config.consumer.protocol.parse()?,
            decryption_key: config.consumer.decryption_key.clone(),
        })
    }
}

/// The identity carried by an accepted response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    /// Asserted subject.
    pub subject: String,
    /// Asserted attributes.
    pub attributes: AttributeMap,
    /// Identity provider that issued the assertion.
    pub issuer: String,
    /// Identifier of the accepted response.
    pub response_id: String,
    /// Identifier of the accepted assertion.
    pub assertion_id: String,
}

/// Consumes responses from a fixed set of identity providers.
#[derive(Debug)]
pub struct ConsumerFacade {
    protocol: SamlVersion,
    policies: HashMap<String, InboundPolicy>,
    replay: ReplayGuard,
    partners: Partners,
}

impl ConsumerFacade {
    /// Resolves the inbound policy of every identity provider in
    /// `identity_providers`.
    ///
    /// # Errors
    ///
    /// Fails on the first identity provider whose policy cannot be resolved.
    pub fn new<'a>(
        settings: ConsumerSettings,
        key_store: Arc<dyn KeyStore>,
        partners: Partners,
        replay: ReplayGuard,
        identity_providers: impl IntoIterator<Item = &'a str>,
    ) -> SamlResult<Self> {
        let mut policies = HashMap::new();
        for idp in identity_providers {
            let resolver =
                partners.resolver(idp, &key_store, &KeyMaterial::default(), &settings.decryption_key)?;
            policies.insert(idp.to_string(), resolver.resolve_inbound_policy(idp, settings.protocol)?);
        }

        tracing::info!(
            protocol = %settings.protocol,
            identity_providers = policies.len(),
            replay_window_minutes = replay.window_minutes(),
            "consumer ready"
        );

        Ok(Self {
            protocol: settings.protocol,
            policies,
            replay,
            partners,
        })
    }

    /// Builds a consumer from configuration over a shared replay ledger.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown protocol, a non-positive replay
    /// window or any unresolvable identity provider.
    pub fn from_config<'a>(
        config: &Config,
        key_store: Arc<dyn KeyStore>,
        partners: Partners,
        ledger: Arc<SeenResponseLedger>,
        identity_providers: impl IntoIterator<Item = &'a str>,
    ) -> SamlResult<Self> {
        let replay = ReplayGuard::new(ledger, config.replay.window_minutes)?;
        Self::new(
            ConsumerSettings::from_config(config)?,
            key_store,
            partners,
            replay,
            identity_providers,
        )
    }

    /// The resolved policy for `idp`.
    #[must_use]
    pub fn policy(&self, idp: &str) -> Option<&InboundPolicy> {
        self.policies.get(idp)
    }

    /// Consumes a base64 POST payload from `idp`.
    ///
    /// # Errors
    ///
    /// Returns the first failed check. Every outcome is audited.
    pub fn consume(
        &self,
        idp: &str,
        payload: &str,
        expected_in_response_to: Option<&str>,
    ) -> Result<AuthenticatedPrincipal, ValidationFailure> {
        self.consume_at(idp, payload, expected_in_response_to, Utc::now())
    }

    /// Like [`consume`](Self::consume), validating at `now`.
    ///
    /// # Errors
    ///
    /// See [`consume`](Self::consume).
    pub fn consume_at(
        &self,
        idp: &str,
        payload: &str,
        expected_in_response_to: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedPrincipal, ValidationFailure> {
        let context = AuditContext::received(idp, self.protocol);
        let audit = self.partners.audit(idp);

        match self.accept(idp, payload, expected_in_response_to, now) {
            Ok(principal) => {
                audit.audit_success(
                    &context,
                    &[
                        ("response_id", principal.response_id.as_str()),
                        ("subject", principal.subject.as_str()),
                    ],
                );
                Ok(principal)
            }
            Err(failure) => {
                tracing::debug!(idp, code = failure.code(), "response rejected");
                audit.audit_error(failure.code(), &context, &failure.details);
                Err(failure)
            }
        }
    }

    fn accept(
        &self,
        idp: &str,
        payload: &str,
        expected_in_response_to: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedPrincipal, ValidationFailure> {
        let policy = self.policies.get(idp).ok_or_else(|| {
            ValidationFailure::new(
                ValidationErrorKind::Issuer,
                format!("no trust policy for issuer '{idp}'"),
            )
        })?;

        let xml = wire::decode_payload(payload).map_err(unexpected)?;
        let signed = SignedXml::extract(&xml).map_err(unexpected)?;
        let response =
            wire::response_from_xml(signed.as_ref().map_or(xml.as_str(), SignedXml::unsigned_xml))
                .map_err(unexpected)?;

        self.replay.check_at(&response, now).into_result()?;

        check_signature(policy, signed.as_ref(), &response)?;

        if !response.is_success() {
            return Err(ValidationFailure::new(
                ValidationErrorKind::Status,
                format!("identity provider returned {}", response.status.describe()),
            ));
        }

        if let Some(expected) = expected_in_response_to {
            if response.in_response_to.as_deref() != Some(expected) {
                return Err(ValidationFailure::new(
                    ValidationErrorKind::Correlation,
                    format!(
                        "response answers {:?}, expected '{expected}'",
                        response.in_response_to
                    ),
                ));
            }
        }

        let assertion = extract_assertion(policy, &response)?;

        let validator = self.partners.validator(idp, self.protocol);
        run_validator(validator.as_ref(), &assertion, idp, now).into_result()?;

        let subject = match self.protocol {
            SamlVersion::V1_1 => Saml11Profile::subject(&assertion),
            SamlVersion::V2_0 => Saml20Profile::subject(&assertion),
        }
        .unwrap_or_default()
        .to_string();

        Ok(AuthenticatedPrincipal {
            subject,
            attributes: assertion.attributes(),
            issuer: idp.to_string(),
            response_id: response.id,
            assertion_id: assertion.id,
        })
    }
}

fn unexpected(err: crate::error::SamlError) -> ValidationFailure {
    ValidationFailure::new(err.failure_kind(), err.to_string())
}

fn check_signature(
    policy: &InboundPolicy,
    signed: Option<&SignedXml>,
    response: &Response,
) -> Result<(), ValidationFailure> {
    if !policy.expects_signature {
        if signed.is_some() {
            tracing::debug!(idp = %policy.idp_entity_id, "ignoring signature from unsigned issuer");
        }
        return Ok(());
    }

    let Some(signed) = signed else {
        return Err(ValidationFailure::new(
            ValidationErrorKind::Signature,
            "response is not signed",
        ));
    };

    if SignatureVerifier::is_signature_good_for(signed, policy, Some(&response.id)) {
        Ok(())
    } else {
        Err(ValidationFailure::new(
            ValidationErrorKind::Signature,
            "response signature is not trusted",
        ))
    }
}

fn extract_assertion(policy: &InboundPolicy, response: &Response) -> Result<Assertion, ValidationFailure> {
    if let Some(encrypted) = response.first_encrypted_assertion() {
        let Some(key) = policy.decryption_credential.as_ref() else {
            return Err(ValidationFailure::new(
                ValidationErrorKind::Decryption,
                "no decryption key for encrypted assertion",
            ));
        };
        return decrypt_assertion(encrypted, key).map_err(|e| {
            ValidationFailure::new(ValidationErrorKind::Decryption, e.to_string())
        });
    }

    if policy.expects_encryption {
        return Err(ValidationFailure::new(
            ValidationErrorKind::Decryption,
            "expected an encrypted assertion",
        ));
    }

    response.first_assertion().cloned().ok_or_else(|| {
        ValidationFailure::new(ValidationErrorKind::Unexpected, "response carries no assertion")
    })
}

/// Runs a possibly partner-supplied validator. A panic inside it is
/// reported as `UNEXPECTED_ERROR` for this message only.
fn run_validator(
    validator: &dyn Validator,
    assertion: &Assertion,
    idp: &str,
    now: DateTime<Utc>,
) -> ValidationResult {
    panic::catch_unwind(AssertUnwindSafe(|| validator.validate_at(assertion, idp, now)))
        .unwrap_or_else(|_| {
            tracing::error!(idp, validator = ?validator, "assertion validator panicked");
            ValidationResult::invalid(ValidationErrorKind::Unexpected, "assertion validator failed")
        })
}

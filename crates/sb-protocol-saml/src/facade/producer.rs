//! Outbound pipeline: build, encrypt, sign, encode.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sb_core::config::ProducerConfig;
use sb_core::KeyMaterial;
use sb_crypto::KeyStore;

use crate::audit::AuditContext;
use crate::builder::{Identity, SamlBuilder};
use crate::encryption::encrypt_assertion;
use crate::error::{SamlError, SamlResult};
use crate::signature::{SignatureConfig, XmlSigner};
use crate::trust::OutboundPolicy;
use crate::types::{SamlBinding, SamlVersion};
use crate::wire;

use super::Partners;

/// Settings for a producer.
#[derive(Debug, Clone)]
pub struct ProducerSettings {
    /// Entity id responses are issued as.
    pub issuer: String,
    /// Protocol spoken.
    pub protocol: SamlVersion,
    /// Assertion lifetime.
    pub assertion_validity: Duration,
    /// Signing key reference.
    pub signing_key: KeyMaterial,
    /// Binding whose endpoint responses are addressed to.
    pub binding: SamlBinding,
}

impl ProducerSettings {
    /// Reads producer settings from configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the issuer is missing, the protocol
    /// is unknown or the validity is not a positive number of minutes.
    pub fn from_config(config: &ProducerConfig) -> SamlResult<Self> {
        let issuer = config.issuer.clone().ok_or_else(|| {
            SamlError::Config(sb_core::Error::Config("SB_ISSUER is required".to_string()))
        })?;
        let protocol = config.protocol.parse()?;
        let assertion_validity = Duration::try_minutes(config.assertion_validity_minutes)
            .filter(|validity| *validity > Duration::zero())
            .ok_or_else(|| {
                SamlError::Config(sb_core::Error::Config(format!(
                    "assertion validity must be a positive number of minutes, got {}",
                    config.assertion_validity_minutes
                )))
            })?;
        Ok(Self {
            issuer,
            protocol,
            assertion_validity,
            signing_key: config.signing_key.clone(),
            binding: SamlBinding::HttpPost,
        })
    }
}

/// A response ready for transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Response identifier.
    pub response_id: String,
    /// Where to deliver it.
    pub destination_url: String,
    /// Serialized (and possibly signed) response.
    pub xml: String,
    /// Base64 payload for the POST binding.
    pub payload: String,
    /// Whether the response is signed.
    pub signed: bool,
    /// Whether the assertion is encrypted.
    pub encrypted: bool,
}

/// Produces responses for a fixed set of service providers.
#[derive(Debug)]
pub struct ProducerFacade {
    builder: SamlBuilder,
    policies: HashMap<String, OutboundPolicy>,
    partners: Partners,
}

impl ProducerFacade {
    /// Resolves the outbound policy of every service provider in
    /// `service_providers`.
    ///
    /// # Errors
    ///
    /// Fails on the first service provider whose policy cannot be resolved.
    pub fn new<'a>(
        settings: ProducerSettings,
        key_store: Arc<dyn KeyStore>,
        partners: Partners,
        service_providers: impl IntoIterator<Item = &'a str>,
    ) -> SamlResult<Self> {
        let mut policies = HashMap::new();
        for sp in service_providers {
            let resolver =
                partners.resolver(sp, &key_store, &settings.signing_key, &KeyMaterial::default())?;
            let policy = resolver.resolve_outbound_policy_for(sp, settings.binding)?;
            policies.insert(sp.to_string(), policy);
        }

        tracing::info!(
            issuer = %settings.issuer,
            protocol = %settings.protocol,
            service_providers = policies.len(),
            "producer ready"
        );

        Ok(Self {
            builder: SamlBuilder::new(settings.issuer, settings.protocol)
                .with_validity(settings.assertion_validity),
            policies,
            partners,
        })
    }

    /// The resolved policy for `sp`.
    #[must_use]
    pub fn policy(&self, sp: &str) -> Option<&OutboundPolicy> {
        self.policies.get(sp)
    }

    /// Produces a response asserting `identity` to `sp`.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::UnknownServiceProvider`] if `sp` was not
    /// configured, or the failing encryption, serialization or signing step.
    pub fn produce(
        &self,
        sp: &str,
        identity: &Identity,
        in_response_to: Option<&str>,
    ) -> SamlResult<OutboundMessage> {
        self.produce_at(sp, identity, in_response_to, Utc::now())
    }

    /// Like [`produce`](Self::produce), issuing at `now`.
    ///
    /// # Errors
    ///
    /// See [`produce`](Self::produce).
    pub fn produce_at(
        &self,
        sp: &str,
        identity: &Identity,
        in_response_to: Option<&str>,
        now: DateTime<Utc>,
    ) -> SamlResult<OutboundMessage> {
        let context = AuditContext::sent(self.builder.issuer(), self.builder.version(), sp);
        let audit = self.partners.audit(sp);

        match self.build(sp, identity, in_response_to, now) {
            Ok(message) => {
                audit.audit_success(&context, &[("response_id", message.response_id.as_str())]);
                Ok(message)
            }
            Err(e) => {
                audit.audit_error(e.failure_kind().code(), &context, &e.to_string());
                Err(e)
            }
        }
    }

    fn build(
        &self,
        sp: &str,
        identity: &Identity,
        in_response_to: Option<&str>,
        now: DateTime<Utc>,
    ) -> SamlResult<OutboundMessage> {
        let policy = self
            .policies
            .get(sp)
            .ok_or_else(|| SamlError::UnknownServiceProvider(sp.to_string()))?;

        let assertion = self.builder.build_assertion(
            identity,
            sp,
            &policy.destination_url,
            in_response_to,
            now,
        );
        let mut response = self
            .builder
            .build_response(&policy.destination_url, in_response_to, now);

        response = match (&policy.encryption_credential, policy.encryption_algorithm) {
            (Some(credential), Some(algorithm)) if policy.must_encrypt => {
                response.with_encrypted_assertion(encrypt_assertion(&assertion, credential, algorithm)?)
            }
            _ => response.with_assertion(assertion),
        };

        let mut xml = wire::response_to_xml(&response)?;

        let mut signed = false;
        if let (true, Some(key)) = (policy.must_sign, &policy.signing_credential) {
            xml = XmlSigner::new(Arc::clone(key))
                .with_config(SignatureConfig::with_algorithm(policy.signature_algorithm))
                .sign(&xml, &response.id)?;
            signed = true;
        }

        tracing::debug!(
            sp,
            response_id = %response.id,
            signed,
            encrypted = policy.must_encrypt,
            "produced response"
        );

        Ok(OutboundMessage {
            payload: wire::encode_payload(&xml),
            response_id: response.id,
            destination_url: policy.destination_url.clone(),
            xml,
            signed,
            encrypted: policy.must_encrypt,
        })
    }
}

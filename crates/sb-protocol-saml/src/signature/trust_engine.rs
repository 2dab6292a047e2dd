//! Trust engines: the pluggable decision of whether a signature over some
//! bytes was produced by a credential trusted for an entity.

use std::collections::HashMap;
use std::fmt;

use x509_parser::prelude::{FromDer, X509Certificate};
use x509_parser::x509::SubjectPublicKeyInfo;

use crate::error::{SamlError, SamlResult};
use crate::types::SamlVersion;

use super::SignatureAlgorithm;

/// What a signature must satisfy to be trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCriteria {
    /// Entity whose credentials may have signed.
    pub entity_id: String,
    /// Protocol the message was received under.
    pub protocol: SamlVersion,
    /// Signature algorithms accepted for this entity.
    pub allowed_algorithms: Vec<SignatureAlgorithm>,
}

impl SignatureCriteria {
    /// Criteria accepting the SHA-2 RSA family.
    #[must_use]
    pub fn new(entity_id: impl Into<String>, protocol: SamlVersion) -> Self {
        Self {
            entity_id: entity_id.into(),
            protocol,
            allowed_algorithms: vec![
                SignatureAlgorithm::RsaSha256,
                SignatureAlgorithm::RsaSha384,
                SignatureAlgorithm::RsaSha512,
            ],
        }
    }

    /// Restricts the accepted algorithms.
    #[must_use]
    pub fn with_allowed_algorithms(mut self, algorithms: Vec<SignatureAlgorithm>) -> Self {
        self.allowed_algorithms = algorithms;
        self
    }

    /// Whether `algorithm` is acceptable.
    #[must_use]
    pub fn allows(&self, algorithm: SignatureAlgorithm) -> bool {
        !algorithm.is_deprecated() && self.allowed_algorithms.contains(&algorithm)
    }
}

/// Decides whether a signature is trusted.
///
/// Implementations must not panic on malformed input; anything that cannot
/// be verified is simply untrusted.
pub trait TrustEngine: Send + Sync + fmt::Debug {
    /// Returns true when `signature` over `signed_data` verifies against a
    /// credential trusted for `criteria.entity_id`.
    fn validate(
        &self,
        signed_data: &[u8],
        signature: &[u8],
        algorithm: SignatureAlgorithm,
        criteria: &SignatureCriteria,
    ) -> bool;
}

/// A public key trusted for verification.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationCredential {
    public_key_der: Vec<u8>,
    source: &'static str,
}

impl fmt::Debug for VerificationCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationCredential")
            .field("source", &self.source)
            .field("key_len", &self.public_key_der.len())
            .finish()
    }
}

impl VerificationCredential {
    /// Wraps a PKCS#1 `RSAPublicKey`.
    #[must_use]
    pub const fn from_public_key_der(public_key_der: Vec<u8>) -> Self {
        Self {
            public_key_der,
            source: "public-key",
        }
    }

    /// Extracts the public key from a DER X.509 certificate.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Metadata`] if the certificate cannot be parsed.
    pub fn from_certificate_der(cert_der: &[u8]) -> SamlResult<Self> {
        let (_, cert) = X509Certificate::from_der(cert_der)
            .map_err(|e| SamlError::Metadata(format!("failed to parse certificate: {e}")))?;
        Ok(Self {
            public_key_der: cert.public_key().subject_public_key.data.to_vec(),
            source: "certificate",
        })
    }

    /// Parses a PEM `CERTIFICATE` or `PUBLIC KEY` block.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Metadata`] if neither block is present or parsable.
    pub fn from_pem(pem: &str) -> SamlResult<Self> {
        if let Some(der) = sb_crypto::pem::pem_to_der(pem, "CERTIFICATE") {
            return Self::from_certificate_der(&der);
        }
        if let Some(der) = sb_crypto::pem::pem_to_der(pem, "PUBLIC KEY") {
            let (_, spki) = SubjectPublicKeyInfo::from_der(&der)
                .map_err(|e| SamlError::Metadata(format!("failed to parse public key: {e}")))?;
            return Ok(Self {
                public_key_der: spki.subject_public_key.data.to_vec(),
                source: "public-key",
            });
        }
        if let Some(der) = sb_crypto::pem::pem_to_der(pem, "RSA PUBLIC KEY") {
            return Ok(Self::from_public_key_der(der));
        }
        Err(SamlError::Metadata(
            "no CERTIFICATE or PUBLIC KEY PEM block".to_string(),
        ))
    }

    /// The PKCS#1 public key bytes.
    #[must_use]
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key_der
    }

    /// Where the key came from.
    #[must_use]
    pub const fn source(&self) -> &'static str {
        self.source
    }

    fn verifies(&self, data: &[u8], signature: &[u8], algorithm: SignatureAlgorithm) -> bool {
        let Some(rsa) = algorithm.rsa_algorithm() else {
            return false;
        };
        sb_crypto::rsa_verify(&self.public_key_der, data, signature, rsa).unwrap_or(false)
    }
}

/// Trust engine backed by explicitly configured credentials per entity.
#[derive(Debug, Clone, Default)]
pub struct CredentialTrustEngine {
    credentials: HashMap<String, Vec<VerificationCredential>>,
}

impl CredentialTrustEngine {
    /// Creates an engine that trusts nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Trusts `credential` for `entity_id`.
    #[must_use]
    pub fn with_credential(
        mut self,
        entity_id: impl Into<String>,
        credential: VerificationCredential,
    ) -> Self {
        self.add_credential(entity_id, credential);
        self
    }

    /// Trusts `credential` for `entity_id`.
    pub fn add_credential(&mut self, entity_id: impl Into<String>, credential: VerificationCredential) {
        self.credentials
            .entry(entity_id.into())
            .or_default()
            .push(credential);
    }

    /// Number of credentials trusted for `entity_id`.
    #[must_use]
    pub fn credential_count(&self, entity_id: &str) -> usize {
        self.credentials.get(entity_id).map_or(0, Vec::len)
    }
}

impl TrustEngine for CredentialTrustEngine {
    fn validate(
        &self,
        signed_data: &[u8],
        signature: &[u8],
        algorithm: SignatureAlgorithm,
        criteria: &SignatureCriteria,
    ) -> bool {
        if !criteria.allows(algorithm) {
            tracing::debug!(
                entity_id = %criteria.entity_id,
                algorithm = algorithm.uri(),
                "signature algorithm not allowed"
            );
            return false;
        }

        let Some(credentials) = self.credentials.get(&criteria.entity_id) else {
            tracing::debug!(entity_id = %criteria.entity_id, "no trusted credentials for entity");
            return false;
        };

        credentials
            .iter()
            .any(|credential| credential.verifies(signed_data, signature, algorithm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_lc_rs::rsa::KeySize;
    use sb_crypto::{RsaSignatureAlgorithm, SigningKey};

    fn criteria(entity: &str) -> SignatureCriteria {
        SignatureCriteria::new(entity, SamlVersion::V2_0)
    }

    #[test]
    fn trusts_configured_key_only_for_its_entity() {
        let key = SigningKey::generate(KeySize::Rsa2048).unwrap();
        let sig = key.sign(b"data", RsaSignatureAlgorithm::RsaSha256).unwrap();
        let engine = CredentialTrustEngine::new().with_credential(
            "idp_saml2",
            VerificationCredential::from_public_key_der(key.public_key_der()),
        );

        assert!(engine.validate(b"data", &sig, SignatureAlgorithm::RsaSha256, &criteria("idp_saml2")));
        assert!(!engine.validate(b"data", &sig, SignatureAlgorithm::RsaSha256, &criteria("other")));
        assert!(!engine.validate(b"tampered", &sig, SignatureAlgorithm::RsaSha256, &criteria("idp_saml2")));
    }

    #[test]
    fn untrusted_key_is_rejected() {
        let trusted = SigningKey::generate(KeySize::Rsa2048).unwrap();
        let attacker = SigningKey::generate(KeySize::Rsa2048).unwrap();
        let sig = attacker.sign(b"data", RsaSignatureAlgorithm::RsaSha256).unwrap();
        let engine = CredentialTrustEngine::new().with_credential(
            "idp_saml2",
            VerificationCredential::from_public_key_der(trusted.public_key_der()),
        );

        assert!(!engine.validate(b"data", &sig, SignatureAlgorithm::RsaSha256, &criteria("idp_saml2")));
    }

    #[test]
    fn disallowed_algorithm_is_rejected() {
        let key = SigningKey::generate(KeySize::Rsa2048).unwrap();
        let sig = key.sign(b"data", RsaSignatureAlgorithm::RsaSha512).unwrap();
        let engine = CredentialTrustEngine::new().with_credential(
            "idp_saml2",
            VerificationCredential::from_public_key_der(key.public_key_der()),
        );
        let only_256 = criteria("idp_saml2")
            .with_allowed_algorithms(vec![SignatureAlgorithm::RsaSha256]);

        assert!(!engine.validate(b"data", &sig, SignatureAlgorithm::RsaSha512, &only_256));
        assert!(!criteria("x").allows(SignatureAlgorithm::RsaSha1));
    }

    #[test]
    fn pem_without_key_block_fails() {
        assert!(VerificationCredential::from_pem("nothing").is_err());
    }
}

//! Resolved trust policies.

use std::sync::Arc;

use sb_crypto::{DataEncryptionAlgorithm, DecryptionKey, EncryptionKey, SigningKey};

use crate::signature::{SignatureAlgorithm, SignatureCriteria, TrustEngine};
use crate::types::SamlVersion;

/// Obligations for content sent to one service provider.
#[derive(Debug, Clone)]
pub struct OutboundPolicy {
    /// Service provider entity id.
    pub sp_entity_id: String,
    /// Whether the response is signed.
    pub must_sign: bool,
    /// Key the response is signed with; set when `must_sign`.
    pub signing_credential: Option<Arc<SigningKey>>,
    /// Signature algorithm.
    pub signature_algorithm: SignatureAlgorithm,
    /// Whether the assertion is encrypted.
    pub must_encrypt: bool,
    /// Content encryption algorithm; set when `must_encrypt`.
    pub encryption_algorithm: Option<DataEncryptionAlgorithm>,
    /// Recipient key; set when `must_encrypt`.
    pub encryption_credential: Option<Arc<EncryptionKey>>,
    /// Where the response is delivered.
    pub destination_url: String,
}

/// Expectations for content received from one identity provider.
#[derive(Debug, Clone)]
pub struct InboundPolicy {
    /// Identity provider entity id.
    pub idp_entity_id: String,
    /// Protocol the provider speaks.
    pub protocol: SamlVersion,
    /// Whether responses must carry a trusted signature.
    pub expects_signature: bool,
    /// Engine that decides signature trust; set when `expects_signature`.
    pub verification_trust_engine: Option<Arc<dyn TrustEngine>>,
    /// Criteria handed to the trust engine.
    pub signature_criteria: SignatureCriteria,
    /// Whether assertions arrive encrypted.
    pub expects_encryption: bool,
    /// Key that decrypts assertions; set when `expects_encryption`.
    pub decryption_credential: Option<Arc<DecryptionKey>>,
}

//! Per-entity metadata and its JSON document form.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use x509_parser::prelude::{FromDer, X509Certificate};

use sb_crypto::EncryptionKey;

use crate::error::{SamlError, SamlResult};
use crate::signature::VerificationCredential;
use crate::types::SamlBinding;

/// Trust-relevant metadata for one partner entity.
#[derive(Clone)]
pub struct EntityMetadata {
    entity_id: String,
    signs_messages: bool,
    encryption_algorithm: Option<String>,
    encryption_credential: Option<Arc<EncryptionKey>>,
    verification_credentials: Vec<VerificationCredential>,
    endpoints: HashMap<SamlBinding, String>,
}

impl fmt::Debug for EntityMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMetadata")
            .field("entity_id", &self.entity_id)
            .field("signs_messages", &self.signs_messages)
            .field("encryption_algorithm", &self.encryption_algorithm)
            .field("has_encryption_credential", &self.encryption_credential.is_some())
            .field("verification_credentials", &self.verification_credentials.len())
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl EntityMetadata {
    /// Metadata for an entity that neither signs nor encrypts.
    #[must_use]
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            signs_messages: false,
            encryption_algorithm: None,
            encryption_credential: None,
            verification_credentials: Vec::new(),
            endpoints: HashMap::new(),
        }
    }

    /// Declares whether the entity signs what it issues.
    #[must_use]
    pub const fn signs_messages(mut self, signs: bool) -> Self {
        self.signs_messages = signs;
        self
    }

    /// Declares the encryption algorithm the entity expects.
    #[must_use]
    pub fn with_encryption_algorithm(mut self, algorithm_uri: impl Into<String>) -> Self {
        self.encryption_algorithm = Some(algorithm_uri.into());
        self
    }

    /// Sets the key assertions for this entity are encrypted to.
    #[must_use]
    pub fn with_encryption_credential(mut self, key: Arc<EncryptionKey>) -> Self {
        self.encryption_credential = Some(key);
        self
    }

    /// Adds a credential the entity's signatures verify against.
    #[must_use]
    pub fn with_verification_credential(mut self, credential: VerificationCredential) -> Self {
        self.verification_credentials.push(credential);
        self
    }

    /// Adds an endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, binding: SamlBinding, url: impl Into<String>) -> Self {
        self.endpoints.insert(binding, url.into());
        self
    }

    /// The entity identifier.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Whether the entity signs.
    #[must_use]
    pub const fn is_signing(&self) -> bool {
        self.signs_messages
    }

    /// Declared encryption algorithm URI.
    #[must_use]
    pub fn encryption_algorithm(&self) -> Option<&str> {
        self.encryption_algorithm.as_deref()
    }

    /// Encryption key, if published.
    #[must_use]
    pub fn encryption_credential(&self) -> Option<&Arc<EncryptionKey>> {
        self.encryption_credential.as_ref()
    }

    /// Verification credentials.
    #[must_use]
    pub fn verification_credentials(&self) -> &[VerificationCredential] {
        &self.verification_credentials
    }

    /// Endpoint for `binding`.
    #[must_use]
    pub fn endpoint(&self, binding: SamlBinding) -> Option<&str> {
        self.endpoints.get(&binding).map(String::as_str)
    }
}

/// JSON form of a metadata set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// Entities in the set.
    #[serde(default)]
    pub entities: Vec<EntityDocument>,
}

/// JSON form of one entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityDocument {
    /// Entity identifier.
    pub entity_id: String,

    /// Whether the entity signs what it issues.
    #[serde(default)]
    pub signs_messages: bool,

    /// Expected encryption algorithm URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_algorithm: Option<String>,

    /// PEM `CERTIFICATE` or `PUBLIC KEY` used for encryption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encryption_credential: Option<String>,

    /// PEM certificates or public keys that verify the entity's signatures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signing_credentials: Vec<String>,

    /// Endpoint URLs keyed by binding name (`HTTP-POST`) or URI.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub endpoints: BTreeMap<String, String>,
}

impl TryFrom<EntityDocument> for EntityMetadata {
    type Error = SamlError;

    fn try_from(doc: EntityDocument) -> SamlResult<Self> {
        let mut entity = Self::new(doc.entity_id).signs_messages(doc.signs_messages);

        if let Some(algorithm) = doc.encryption_algorithm {
            entity = entity.with_encryption_algorithm(algorithm);
        }
        if let Some(pem) = doc.encryption_credential {
            let key = encryption_key_from_pem(&pem).map_err(|e| {
                SamlError::Metadata(format!(
                    "{}: bad encryption credential: {e}",
                    entity.entity_id
                ))
            })?;
            entity = entity.with_encryption_credential(Arc::new(key));
        }
        for pem in &doc.signing_credentials {
            entity = entity.with_verification_credential(VerificationCredential::from_pem(pem)?);
        }
        for (binding, url) in doc.endpoints {
            let parsed = SamlBinding::from_name(&binding).ok_or_else(|| {
                SamlError::Metadata(format!(
                    "{}: unknown binding '{binding}'",
                    entity.entity_id
                ))
            })?;
            entity = entity.with_endpoint(parsed, url);
        }
        Ok(entity)
    }
}

/// Loads an encryption key from a PEM certificate or public key.
///
/// # Errors
///
/// Returns an error if no usable RSA key is found.
pub fn encryption_key_from_pem(pem: &str) -> SamlResult<EncryptionKey> {
    if let Some(der) = sb_crypto::pem::pem_to_der(pem, "CERTIFICATE") {
        let (_, cert) = X509Certificate::from_der(&der)
            .map_err(|e| SamlError::Metadata(format!("failed to parse certificate: {e}")))?;
        return Ok(EncryptionKey::from_der(cert.public_key().raw)?);
    }
    Ok(EncryptionKey::from_pem(pem)?)
}

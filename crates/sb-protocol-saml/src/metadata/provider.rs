//! In-memory metadata provider.

use std::collections::HashMap;
use std::sync::Arc;

use sb_crypto::EncryptionKey;

use crate::error::{SamlError, SamlResult};
use crate::signature::{CredentialTrustEngine, TrustEngine};
use crate::types::SamlBinding;

use super::{EntityMetadata, MetadataDocument, MetadataProvider};

/// Metadata provider over a fixed set of entities.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataProvider {
    entities: HashMap<String, EntityMetadata>,
    trust_engine: Arc<CredentialTrustEngine>,
}

impl StaticMetadataProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entity, replacing any earlier entry with the same id.
    #[must_use]
    pub fn with_entity(mut self, entity: EntityMetadata) -> Self {
        self.insert(entity);
        self
    }

    /// Adds an entity, replacing any earlier entry with the same id.
    pub fn insert(&mut self, entity: EntityMetadata) {
        let engine = Arc::make_mut(&mut self.trust_engine);
        for credential in entity.verification_credentials() {
            engine.add_credential(entity.entity_id(), credential.clone());
        }
        tracing::debug!(
            entity_id = entity.entity_id(),
            signs = entity.is_signing(),
            "loaded entity metadata"
        );
        self.entities.insert(entity.entity_id().to_string(), entity);
    }

    /// Builds a provider from a metadata document.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Metadata`] for duplicate entities or unusable
    /// credentials.
    pub fn from_document(document: MetadataDocument) -> SamlResult<Self> {
        let mut provider = Self::new();
        for doc in document.entities {
            if provider.has_entity(&doc.entity_id) {
                return Err(SamlError::Metadata(format!(
                    "duplicate entity '{}'",
                    doc.entity_id
                )));
            }
            provider.insert(EntityMetadata::try_from(doc)?);
        }
        Ok(provider)
    }

    /// Parses a JSON metadata document.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Metadata`] if the JSON is malformed or an entity
    /// is invalid.
    pub fn from_json(json: &str) -> SamlResult<Self> {
        let document: MetadataDocument = serde_json::from_str(json)
            .map_err(|e| SamlError::Metadata(format!("invalid metadata document: {e}")))?;
        Self::from_document(document)
    }

    /// Looks up an entity.
    #[must_use]
    pub fn entity(&self, entity_id: &str) -> Option<&EntityMetadata> {
        self.entities.get(entity_id)
    }

    /// Known entity ids, sorted.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entities.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl MetadataProvider for StaticMetadataProvider {
    fn has_entity(&self, entity_id: &str) -> bool {
        self.entities.contains_key(entity_id)
    }

    fn signing_expectation(&self, issuer: &str) -> bool {
        self.entity(issuer).is_some_and(EntityMetadata::is_signing)
    }

    fn encryption_algorithm(&self, sp: &str) -> Option<String> {
        self.entity(sp)
            .and_then(EntityMetadata::encryption_algorithm)
            .map(str::to_string)
    }

    fn encryption_credential(&self, sp: &str) -> Option<Arc<EncryptionKey>> {
        self.entity(sp)
            .and_then(EntityMetadata::encryption_credential)
            .cloned()
    }

    fn verification_trust_engine(&self) -> Arc<dyn TrustEngine> {
        self.trust_engine.clone()
    }

    fn destination_url(&self, sp: &str, binding: SamlBinding) -> Option<String> {
        self.entity(sp)
            .and_then(|entity| entity.endpoint(binding))
            .map(str::to_string)
    }
}

//! Producer and consumer pipelines.
//!
//! Both facades resolve their trust policies once, at construction, for the
//! partners they are configured with. An unknown partner or unusable key
//! material therefore fails startup rather than a message.

mod consumer;
mod producer;

pub use consumer::*;
pub use producer::*;

use std::sync::Arc;

use sb_core::KeyMaterial;
use sb_crypto::KeyStore;

use crate::audit::{AuditSink, TracingAuditSink};
use crate::error::SamlResult;
use crate::metadata::MetadataProvider;
use crate::overrides::PartnerStrategies;
use crate::translation::EntityTranslator;
use crate::trust::TrustPolicyResolver;
use crate::types::SamlVersion;
use crate::validation::Validator;

/// Per-partner collaborators: override registries plus the code/entity
/// translation used to key them.
#[derive(Debug, Clone)]
pub struct Partners {
    strategies: Arc<PartnerStrategies>,
    translator: Arc<EntityTranslator>,
}

impl Partners {
    /// Combines registries and translation.
    #[must_use]
    pub const fn new(strategies: Arc<PartnerStrategies>, translator: Arc<EntityTranslator>) -> Self {
        Self {
            strategies,
            translator,
        }
    }

    /// Stock strategies over `metadata` and no translations.
    #[must_use]
    pub fn with_metadata(metadata: Arc<dyn MetadataProvider>) -> Self {
        Self::new(
            Arc::new(PartnerStrategies::new(metadata)),
            Arc::new(EntityTranslator::new()),
        )
    }

    /// Override registries.
    #[must_use]
    pub fn strategies(&self) -> &Arc<PartnerStrategies> {
        &self.strategies
    }

    /// Code/entity translation.
    #[must_use]
    pub fn translator(&self) -> &Arc<EntityTranslator> {
        &self.translator
    }

    fn code<'a>(&'a self, entity_id: &'a str) -> &'a str {
        self.translator.lookup_internal_code(entity_id)
    }

    fn resolver(
        &self,
        entity_id: &str,
        key_store: &Arc<dyn KeyStore>,
        signing_key: &KeyMaterial,
        decryption_key: &KeyMaterial,
    ) -> SamlResult<TrustPolicyResolver> {
        let metadata = self.strategies.metadata(self.code(entity_id))?;
        Ok(TrustPolicyResolver::new(
            metadata,
            Arc::clone(key_store),
            signing_key.clone(),
            decryption_key.clone(),
        ))
    }

    fn audit(&self, entity_id: &str) -> Arc<dyn AuditSink> {
        self.strategies
            .audit_sink(self.code(entity_id))
            .unwrap_or_else(|_| Arc::new(TracingAuditSink))
    }

    fn validator(&self, entity_id: &str, version: SamlVersion) -> Arc<dyn Validator> {
        self.strategies.validator(self.code(entity_id), version)
    }
}

//! Per-partner overrides.
//!
//! Customers may replace the stock validator, audit sink or metadata
//! provider for individual partners. Each extension point is a
//! [`StrategyRegistry`] keyed by partner code whose `default` entry holds the
//! stock implementation.

use std::sync::Arc;

use sb_spi::{Spi, SpiError, StrategyRegistry};

use crate::audit::{AuditSink, TracingAuditSink};
use crate::metadata::MetadataProvider;
use crate::types::SamlVersion;
use crate::validation::{validator_for, Validator};

/// Assertion validator extension point.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorSpi;

impl Spi for ValidatorSpi {
    fn name(&self) -> &'static str {
        "validator"
    }
}

/// Audit sink extension point.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditSpi;

impl Spi for AuditSpi {
    fn name(&self) -> &'static str {
        "audit"
    }
}

/// Metadata provider extension point.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataSpi;

impl Spi for MetadataSpi {
    fn name(&self) -> &'static str {
        "metadata"
    }
}

/// The three override registries.
#[derive(Debug)]
pub struct PartnerStrategies {
    validators: StrategyRegistry<dyn Validator>,
    audit_sinks: StrategyRegistry<dyn AuditSink>,
    metadata_providers: StrategyRegistry<dyn MetadataProvider>,
}

impl PartnerStrategies {
    /// Registries with the stock validator and tracing audit sink, and
    /// `metadata` as the default metadata provider.
    #[must_use]
    pub fn new(metadata: Arc<dyn MetadataProvider>) -> Self {
        Self {
            validators: StrategyRegistry::with_default(
                ValidatorSpi.name(),
                validator_for(SamlVersion::V2_0),
            ),
            audit_sinks: StrategyRegistry::with_default(
                AuditSpi.name(),
                Arc::new(TracingAuditSink) as Arc<dyn AuditSink>,
            ),
            metadata_providers: StrategyRegistry::with_default(MetadataSpi.name(), metadata),
        }
    }

    /// Replaces the default audit sink.
    #[must_use]
    pub fn with_default_audit_sink(self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sinks.register(sb_spi::DEFAULT_STRATEGY, sink);
        self
    }

    /// Validator registry.
    #[must_use]
    pub const fn validators(&self) -> &StrategyRegistry<dyn Validator> {
        &self.validators
    }

    /// Audit sink registry.
    #[must_use]
    pub const fn audit_sinks(&self) -> &StrategyRegistry<dyn AuditSink> {
        &self.audit_sinks
    }

    /// Metadata provider registry.
    #[must_use]
    pub const fn metadata_providers(&self) -> &StrategyRegistry<dyn MetadataProvider> {
        &self.metadata_providers
    }

    /// The validator for `partner` speaking `version`.
    ///
    /// A registered override applies only when it validates the same
    /// protocol version; otherwise the stock validator for `version` is used.
    #[must_use]
    pub fn validator(&self, partner: &str, version: SamlVersion) -> Arc<dyn Validator> {
        match self.validators.resolve(partner) {
            Ok(validator) if validator.version() == version => validator,
            _ => validator_for(version),
        }
    }

    /// The audit sink for `partner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the default entry was removed.
    pub fn audit_sink(&self, partner: &str) -> Result<Arc<dyn AuditSink>, SpiError> {
        self.audit_sinks.resolve(partner)
    }

    /// The metadata provider for `partner`.
    ///
    /// # Errors
    ///
    /// Returns an error if the default entry was removed.
    pub fn metadata(&self, partner: &str) -> Result<Arc<dyn MetadataProvider>, SpiError> {
        self.metadata_providers.resolve(partner)
    }
}

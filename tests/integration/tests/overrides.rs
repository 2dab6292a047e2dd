//! Per-partner strategy overrides wired through the consumer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sb_protocol_saml::audit::InMemoryAuditSink;
use sb_protocol_saml::builder::Identity;
use sb_protocol_saml::facade::Partners;
use sb_protocol_saml::overrides::PartnerStrategies;
use sb_protocol_saml::translation::EntityTranslator;
use sb_protocol_saml::validation::{validator_for, Validator};
use sb_protocol_saml::{Assertion, SamlVersion, ValidationErrorKind, ValidationResult};

use crate::common::{Federation, Options, IDP, SP};

/// Stock checks plus an allow-list of subjects.
#[derive(Debug)]
struct AllowListValidator {
    allowed: Vec<&'static str>,
}

impl Validator for AllowListValidator {
    fn version(&self) -> SamlVersion {
        SamlVersion::V2_0
    }

    fn validate_at(&self, assertion: &Assertion, expected_issuer: &str, now: DateTime<Utc>) -> ValidationResult {
        let stock = validator_for(SamlVersion::V2_0).validate_at(assertion, expected_issuer, now);
        if !stock.is_valid() {
            return stock;
        }
        let subject = assertion
            .subject_name_id()
            .map(|name_id| name_id.value.as_str())
            .unwrap_or_default();
        if self.allowed.contains(&subject) {
            ValidationResult::Valid
        } else {
            ValidationResult::invalid(
                ValidationErrorKind::MissingSubject,
                format!("subject '{subject}' is not on the allow list"),
            )
        }
    }
}

fn acme_partners(federation: &Federation, acme_audit: Arc<InMemoryAuditSink>) -> Partners {
    let strategies = PartnerStrategies::new(federation.idp_metadata.clone())
        .with_default_audit_sink(federation.sp_audit.clone());
    strategies.validators().register(
        "ACME",
        Arc::new(AllowListValidator {
            allowed: vec!["alice"],
        }),
    );
    strategies.audit_sinks().register("ACME", acme_audit);

    let translator = EntityTranslator::new().with_mapping("ACME", IDP);
    Partners::new(Arc::new(strategies), Arc::new(translator))
}

#[test]
fn partner_validator_and_audit_sink_apply() -> anyhow::Result<()> {
    let federation = Federation::new(Options::default())?;
    let acme_audit = Arc::new(InMemoryAuditSink::new());
    let consumer = federation.consumer_with(acme_partners(&federation, acme_audit.clone()))?;
    let producer = federation.producer()?;

    let alice = producer.produce(SP, &Identity::new("alice"), None)?;
    assert!(consumer.consume(IDP, &alice.payload, None).is_ok());

    let bob = producer.produce(SP, &Identity::new("bob"), None)?;
    let failure = consumer.consume(IDP, &bob.payload, None).unwrap_err();
    assert_eq!(failure.kind, ValidationErrorKind::MissingSubject);
    assert!(failure.details.contains("allow list"));

    assert_eq!(acme_audit.events().len(), 2);
    assert!(federation.sp_audit.events().is_empty());
    Ok(())
}

#[test]
fn partners_without_override_use_stock_validation() -> anyhow::Result<()> {
    let federation = Federation::new(Options::default())?;
    let consumer = federation.consumer()?;

    let bob = federation.producer()?.produce(SP, &Identity::new("bob"), None)?;
    assert!(consumer.consume(IDP, &bob.payload, None).is_ok());
    assert_eq!(federation.sp_audit.events().len(), 1);
    Ok(())
}

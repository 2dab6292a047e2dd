//! Assertion validation, translation and policy scenarios.

use chrono::{Duration, Utc};
use sb_core::KeyMaterial;
use sb_protocol_saml::builder::{Identity, SamlBuilder};
use sb_protocol_saml::translation::EntityTranslator;
use sb_protocol_saml::trust::TrustPolicyResolver;
use sb_protocol_saml::validation::{
    validator_for, Saml11AssertionValidator, Saml20AssertionValidator, Validator,
};
use sb_protocol_saml::{SamlVersion, ValidationErrorKind};

use crate::common::{signing_material, Federation, Options, SP};

#[test]
fn saml11_assertion_from_expected_issuer_is_valid() {
    let now = Utc::now();
    let assertion = SamlBuilder::new("idp_saml11", SamlVersion::V1_1).build_assertion(
        &Identity::new("189502"),
        SP,
        "https://sp.example.com/acs",
        None,
        now,
    );
    let validator = Saml11AssertionValidator::new();

    assert!(validator.validate_at(&assertion, "idp_saml11", now).is_valid());

    let result = validator.validate_at(&assertion, "idp_saml2", now);
    let failure = result.failure().expect("issuer mismatch");
    assert_eq!(failure.kind, ValidationErrorKind::Issuer);
    assert!(failure.details.contains("issuer"));
}

#[test]
fn window_is_strict_on_both_ends() {
    let issued = Utc::now();
    let validity = Duration::minutes(30);
    let assertion = SamlBuilder::new("idp_saml2", SamlVersion::V2_0)
        .with_validity(validity)
        .build_assertion(&Identity::new("189502"), SP, "https://sp.example.com/acs", None, issued);
    let validator = Saml20AssertionValidator::new();
    let kind = |at| validator.validate_at(&assertion, "idp_saml2", at).error_kind();

    assert_eq!(kind(issued), None);
    assert_eq!(kind(issued - Duration::minutes(1)), Some(ValidationErrorKind::InvalidTimeframe));
    assert_eq!(kind(issued + validity), Some(ValidationErrorKind::InvalidTimeframe));
    assert_eq!(kind(issued + validity - Duration::seconds(1)), None);
}

#[test]
fn issuer_mismatch_wins_over_other_faults() {
    let issued = Utc::now() - Duration::days(1);
    let assertion = SamlBuilder::new("idp_saml2", SamlVersion::V2_0).build_assertion(
        &Identity::new(" "),
        SP,
        "https://sp.example.com/acs",
        None,
        issued,
    );

    assert_eq!(
        validator_for(SamlVersion::V2_0)
            .validate(&assertion, "someone-else")
            .error_kind(),
        Some(ValidationErrorKind::Issuer)
    );
}

#[test]
fn translation_falls_back_to_identity() {
    let translator = EntityTranslator::new().with_mapping("ACME", "https://idp.acme.example");

    assert_eq!(translator.lookup_entity_identifier("x"), "x");
    assert_eq!(translator.lookup_internal_code("x"), "x");

    let entity = translator.lookup_entity_identifier("ACME");
    assert_eq!(entity, "https://idp.acme.example");
    assert_eq!(translator.lookup_internal_code(entity), "ACME");
}

#[test]
fn any_missing_signing_field_disables_signing() -> anyhow::Result<()> {
    let federation = Federation::new(Options::default())?;
    let complete = signing_material();
    let partials = [
        KeyMaterial { store: None, ..complete.clone() },
        KeyMaterial { store_password: None, ..complete.clone() },
        KeyMaterial { alias: None, ..complete.clone() },
        KeyMaterial { key_password: None, ..complete.clone() },
    ];

    for partial in partials {
        let resolver = TrustPolicyResolver::new(
            federation.sp_metadata.clone(),
            federation.idp_keys.clone(),
            partial,
            KeyMaterial::default(),
        );
        let policy = resolver.resolve_outbound_policy(SP)?;
        assert!(!policy.must_sign);
        assert!(policy.signing_credential.is_none());
    }

    let resolver = TrustPolicyResolver::new(
        federation.sp_metadata.clone(),
        federation.idp_keys.clone(),
        complete,
        KeyMaterial::default(),
    );
    assert!(resolver.resolve_outbound_policy(SP)?.must_sign);
    Ok(())
}

#[test]
fn encryption_needs_declared_algorithm_and_material() -> anyhow::Result<()> {
    let encrypting = Federation::new(Options {
        encrypt: true,
        ..Options::default()
    })?;

    let with_material = TrustPolicyResolver::new(
        encrypting.sp_metadata.clone(),
        encrypting.idp_keys.clone(),
        signing_material(),
        KeyMaterial::default(),
    );
    assert!(with_material.resolve_outbound_policy(SP)?.must_encrypt);

    let without_material = TrustPolicyResolver::new(
        encrypting.sp_metadata.clone(),
        encrypting.idp_keys.clone(),
        KeyMaterial::default(),
        KeyMaterial::default(),
    );
    assert!(!without_material.resolve_outbound_policy(SP)?.must_encrypt);

    let plain = Federation::new(Options::default())?;
    let undeclared = TrustPolicyResolver::new(
        plain.sp_metadata.clone(),
        plain.idp_keys.clone(),
        signing_material(),
        KeyMaterial::default(),
    );
    assert!(!undeclared.resolve_outbound_policy(SP)?.must_encrypt);
    Ok(())
}

#[test]
fn unknown_partners_fail_at_construction() -> anyhow::Result<()> {
    let federation = Federation::new(Options::default())?;
    let resolver = TrustPolicyResolver::new(
        federation.sp_metadata.clone(),
        federation.idp_keys.clone(),
        KeyMaterial::default(),
        KeyMaterial::default(),
    );

    assert!(resolver.resolve_outbound_policy("https://unknown.example").is_err());
    assert!(resolver
        .resolve_inbound_policy("https://unknown.example", SamlVersion::V2_0)
        .is_err());
    Ok(())
}

//! Producer to consumer round trips.

use sb_core::KeyMaterial;
use sb_protocol_saml::builder::Identity;
use sb_protocol_saml::wire;
use sb_protocol_saml::{SamlVersion, ValidationErrorKind};

use crate::common::{signing_material, Federation, Options, IDP, SP};

fn alice() -> Identity {
    Identity::new("alice")
        .with_attribute("email", "alice@example.com")
        .with_attribute("role", "admin")
        .with_attribute("role", "auditor")
}

#[test]
fn signed_and_encrypted_saml20() -> anyhow::Result<()> {
    let federation = Federation::new(Options {
        encrypt: true,
        ..Options::default()
    })?;
    let producer = federation.producer()?;
    let consumer = federation.consumer()?;

    let message = producer.produce(SP, &alice(), Some("req-1"))?;
    assert!(message.signed);
    assert!(message.encrypted);
    assert!(message.xml.contains("EncryptedAssertion"));
    assert!(!message.xml.contains("alice@example.com"));

    let principal = consumer.consume(IDP, &message.payload, Some("req-1"))?;
    assert_eq!(principal.subject, "alice");
    assert_eq!(principal.issuer, IDP);
    assert_eq!(principal.response_id, message.response_id);
    assert_eq!(
        principal.attributes["role"],
        vec!["admin".to_string(), "auditor".to_string()]
    );

    assert_eq!(federation.idp_audit.events().len(), 1);
    let received = federation.sp_audit.last().expect("audit event");
    assert!(received.code.is_none());
    assert_eq!(received.idp_id.as_deref(), Some(IDP));
    Ok(())
}

#[test]
fn signed_saml11() -> anyhow::Result<()> {
    let federation = Federation::new(Options {
        protocol: SamlVersion::V1_1,
        ..Options::default()
    })?;

    let message = federation.producer()?.produce(SP, &alice(), None)?;
    assert!(message.signed);
    assert!(!message.encrypted);

    let principal = federation.consumer()?.consume(IDP, &message.payload, None)?;
    assert_eq!(principal.subject, "alice");
    assert_eq!(principal.attributes["email"], vec!["alice@example.com".to_string()]);
    Ok(())
}

#[test]
fn unsigned_federation() -> anyhow::Result<()> {
    let federation = Federation::new(Options {
        sign: false,
        ..Options::default()
    })?;

    let message = federation.producer()?.produce(SP, &alice(), None)?;
    assert!(!message.signed);
    assert!(federation.consumer()?.consume(IDP, &message.payload, None).is_ok());
    Ok(())
}

#[test]
fn partial_signing_material_yields_unsigned_response_that_is_rejected() -> anyhow::Result<()> {
    let federation = Federation::new(Options::default())?;
    let partial = KeyMaterial {
        alias: None,
        ..signing_material()
    };

    let producer = federation.producer_with(partial)?;
    assert!(!producer.policy(SP).expect("policy").must_sign);

    let message = producer.produce(SP, &alice(), None)?;
    assert!(!message.signed);

    let failure = federation
        .consumer()?
        .consume(IDP, &message.payload, None)
        .unwrap_err();
    assert_eq!(failure.kind, ValidationErrorKind::Signature);
    assert_eq!(
        federation.sp_audit.last().and_then(|e| e.code),
        Some("SIGNATURE_ERROR".to_string())
    );
    Ok(())
}

#[test]
fn tampered_response_is_rejected() -> anyhow::Result<()> {
    let federation = Federation::new(Options::default())?;
    let message = federation.producer()?.produce(SP, &alice(), None)?;

    let tampered = message.xml.replace(">alice<", ">mallory<");
    assert_ne!(tampered, message.xml);

    let failure = federation
        .consumer()?
        .consume(IDP, &wire::encode_payload(&tampered), None)
        .unwrap_err();
    assert_eq!(failure.kind, ValidationErrorKind::Signature);
    Ok(())
}

#[test]
fn widened_whitespace_in_signed_values_is_rejected() -> anyhow::Result<()> {
    let federation = Federation::new(Options::default())?;
    let identity = Identity::new("alice smith").with_attribute("role", "read only");
    let message = federation.producer()?.produce(SP, &identity, None)?;

    let tampered = message
        .xml
        .replace("alice smith", "alice    smith")
        .replace("read only", "read   only");
    assert_ne!(tampered, message.xml);

    let failure = federation
        .consumer()?
        .consume(IDP, &wire::encode_payload(&tampered), None)
        .unwrap_err();
    assert_eq!(failure.kind, ValidationErrorKind::Signature);
    assert_eq!(failure.code(), "SIGNATURE_ERROR");
    Ok(())
}

#[test]
fn signature_from_unknown_key_is_rejected() -> anyhow::Result<()> {
    let honest = Federation::new(Options::default())?;
    let impostor = Federation::new(Options::default())?;

    let forged = impostor.producer()?.produce(SP, &alice(), None)?;
    let failure = honest
        .consumer()?
        .consume(IDP, &forged.payload, None)
        .unwrap_err();
    assert_eq!(failure.kind, ValidationErrorKind::Signature);
    Ok(())
}

#[test]
fn plaintext_assertion_when_encryption_expected() -> anyhow::Result<()> {
    let plain = Federation::new(Options {
        sign: false,
        ..Options::default()
    })?;
    let encrypting = Federation::new(Options {
        sign: false,
        encrypt: true,
        ..Options::default()
    })?;

    let message = plain.producer()?.produce(SP, &alice(), None)?;
    assert!(!message.encrypted);

    let failure = encrypting
        .consumer()?
        .consume(IDP, &message.payload, None)
        .unwrap_err();
    assert_eq!(failure.kind, ValidationErrorKind::Decryption);
    Ok(())
}

#[test]
fn assertion_for_another_key_cannot_be_decrypted() -> anyhow::Result<()> {
    let ours = Federation::new(Options {
        sign: false,
        encrypt: true,
        ..Options::default()
    })?;
    let theirs = Federation::new(Options {
        sign: false,
        encrypt: true,
        ..Options::default()
    })?;

    let message = theirs.producer()?.produce(SP, &alice(), None)?;
    let failure = ours.consumer()?.consume(IDP, &message.payload, None).unwrap_err();
    assert_eq!(failure.kind, ValidationErrorKind::Decryption);
    Ok(())
}

#[test]
fn correlation_is_checked_only_when_requested() -> anyhow::Result<()> {
    let federation = Federation::new(Options::default())?;
    let producer = federation.producer()?;
    let consumer = federation.consumer()?;

    let answered = producer.produce(SP, &alice(), Some("req-1"))?;
    let failure = consumer
        .consume(IDP, &answered.payload, Some("req-2"))
        .unwrap_err();
    assert_eq!(failure.kind, ValidationErrorKind::Correlation);

    let unsolicited = producer.produce(SP, &alice(), None)?;
    assert!(consumer.consume(IDP, &unsolicited.payload, None).is_ok());
    Ok(())
}

#[test]
fn protocol_mismatch_is_a_version_error() -> anyhow::Result<()> {
    let saml11 = Federation::new(Options {
        protocol: SamlVersion::V1_1,
        sign: false,
        ..Options::default()
    })?;
    let saml20 = Federation::new(Options {
        sign: false,
        ..Options::default()
    })?;

    let message = saml11.producer()?.produce(SP, &alice(), None)?;
    let failure = saml20.consumer()?.consume(IDP, &message.payload, None).unwrap_err();
    assert_eq!(failure.kind, ValidationErrorKind::Version);
    Ok(())
}

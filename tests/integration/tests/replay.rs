//! Replay protection across calls and facades.

use chrono::{Duration, Utc};
use sb_protocol_saml::builder::Identity;
use sb_protocol_saml::validation::{validate_response, ReplayGuard, SeenResponseLedger};
use sb_protocol_saml::{Response, SamlVersion, ValidationErrorKind};

use crate::common::{Federation, Options, IDP, SP};

#[test]
fn second_delivery_within_window_is_replay() -> anyhow::Result<()> {
    let guard = ReplayGuard::new(SeenResponseLedger::shared(), 30)?;
    let first = Utc::now();
    let response = Response::success("R-100", SamlVersion::V2_0, first);

    assert!(guard.check_at(&response, first).is_valid());

    let result = guard.check_at(&response, first + Duration::minutes(2));
    let failure = result.failure().expect("replay");
    assert_eq!(failure.kind, ValidationErrorKind::Replay);
    assert!(failure.details.contains("R-100"));
    assert!(failure.details.contains("30"));
    Ok(())
}

#[test]
fn delivery_after_window_is_accepted() -> anyhow::Result<()> {
    let guard = ReplayGuard::new(SeenResponseLedger::shared(), 30)?;
    let first = Utc::now();
    let response = Response::success("R-200", SamlVersion::V2_0, first);

    assert!(guard.check_at(&response, first).is_valid());
    assert!(guard.check_at(&response, first + Duration::minutes(31)).is_valid());
    Ok(())
}

#[test]
fn free_function_uses_the_given_ledger() {
    let ledger = SeenResponseLedger::new();
    let response = Response::success("R-300", SamlVersion::V1_1, Utc::now());

    assert!(validate_response(&response, &ledger, 30).is_valid());
    assert_eq!(
        validate_response(&response, &ledger, 30).error_kind(),
        Some(ValidationErrorKind::Replay)
    );
}

#[test]
fn consumer_rejects_redelivered_payload() -> anyhow::Result<()> {
    let federation = Federation::new(Options::default())?;
    let message = federation
        .producer()?
        .produce(SP, &Identity::new("alice"), None)?;
    let consumer = federation.consumer()?;

    assert!(consumer.consume(IDP, &message.payload, None).is_ok());
    let failure = consumer.consume(IDP, &message.payload, None).unwrap_err();
    assert_eq!(failure.kind, ValidationErrorKind::Replay);
    assert!(failure.details.contains(&message.response_id));
    Ok(())
}

#[test]
fn ledger_is_shared_between_consumers() -> anyhow::Result<()> {
    let federation = Federation::new(Options::default())?;
    let message = federation
        .producer()?
        .produce(SP, &Identity::new("alice"), None)?;

    let first = federation.consumer()?;
    let second = federation.consumer()?;

    assert!(first.consume(IDP, &message.payload, None).is_ok());
    let failure = second.consume(IDP, &message.payload, None).unwrap_err();
    assert_eq!(failure.kind, ValidationErrorKind::Replay);
    assert_eq!(federation.ledger.len(), 1);
    Ok(())
}

//! Wire codec.
//!
//! Messages are marshalled with `quick-xml`'s serde support and carried
//! base64 encoded, as in the HTTP-POST binding.

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{SamlError, SamlResult};
use crate::types::{Assertion, Response};

/// Serializes a SAML element.
///
/// # Errors
///
/// Returns [`SamlError::XmlSerialize`] if serialization fails.
pub fn to_xml<T: Serialize>(value: &T) -> SamlResult<String> {
    quick_xml::se::to_string(value).map_err(|e| SamlError::XmlSerialize(e.to_string()))
}

/// Parses a SAML element.
///
/// # Errors
///
/// Returns [`SamlError::XmlParse`] if the XML does not match `T`.
pub fn from_xml<T: DeserializeOwned>(xml: &str) -> SamlResult<T> {
    Ok(quick_xml::de::from_str(xml)?)
}

/// Serializes a response.
///
/// # Errors
///
/// See [`to_xml`].
pub fn response_to_xml(response: &Response) -> SamlResult<String> {
    to_xml(response)
}

/// Parses a response.
///
/// # Errors
///
/// See [`from_xml`].
pub fn response_from_xml(xml: &str) -> SamlResult<Response> {
    from_xml(xml)
}

/// Serializes an assertion.
///
/// # Errors
///
/// See [`to_xml`].
pub fn assertion_to_xml(assertion: &Assertion) -> SamlResult<String> {
    to_xml(assertion)
}

/// Parses an assertion.
///
/// # Errors
///
/// See [`from_xml`].
pub fn assertion_from_xml(xml: &str) -> SamlResult<Assertion> {
    from_xml(xml)
}

/// Base64-encodes an XML message for transport.
#[must_use]
pub fn encode_payload(xml: &str) -> String {
    base64::engine::general_purpose::STANDARD.encode(xml)
}

/// Decodes a transported message. Line breaks inside the payload are
/// tolerated.
///
/// # Errors
///
/// Returns [`SamlError::Base64Decode`] if the payload is not base64 or not
/// UTF-8.
pub fn decode_payload(payload: &str) -> SamlResult<String> {
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let decoded = base64::engine::general_purpose::STANDARD.decode(compact)?;
    String::from_utf8(decoded)
        .map_err(|e| SamlError::Base64Decode(format!("invalid UTF-8 in message: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    use crate::types::{Conditions, NameId, SamlVersion, Subject};

    #[test]
    fn response_survives_the_wire() {
        let instant = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let assertion = Assertion::new("_a1", SamlVersion::V2_0, instant)
            .with_issuer("idp_saml2")
            .with_subject(Subject::new(NameId::new("189502")))
            .with_conditions(Conditions::window(instant, instant + Duration::minutes(30)));
        let response = Response::success("_r1", SamlVersion::V2_0, instant)
            .with_issuer("idp_saml2")
            .with_assertion(assertion);

        let xml = response_to_xml(&response).unwrap();
        assert!(xml.starts_with("<Response "));
        assert!(!xml.contains('\n'));

        let payload = encode_payload(&xml);
        let parsed = response_from_xml(&decode_payload(&payload).unwrap()).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn saml11_issuer_is_an_attribute() {
        let instant = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let assertion = Assertion::new("_a1", SamlVersion::V1_1, instant).with_issuer("idp_saml11");

        let xml = assertion_to_xml(&assertion).unwrap();
        assert!(xml.contains(r#"Issuer="idp_saml11""#));
        assert!(!xml.contains("<Issuer>"));
        assert_eq!(assertion_from_xml(&xml).unwrap(), assertion);
    }

    #[test]
    fn wrapped_payload_decodes() {
        let payload = encode_payload("<Response/>");
        let wrapped = format!("{}\n{}", &payload[..4], &payload[4..]);
        assert_eq!(decode_payload(&wrapped).unwrap(), "<Response/>");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(decode_payload("%%%"), Err(SamlError::Base64Decode(_))));
        assert!(matches!(response_from_xml("<Nope/>"), Err(SamlError::XmlParse(_))));
    }
}

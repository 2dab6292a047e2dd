//! XML Signature creation.

use std::sync::Arc;

use base64::Engine;
use sb_crypto::SigningKey;

use crate::error::{SamlError, SamlResult};

use super::{calculate_digest, canonicalize, signed_info_xml, SignatureConfig};

/// XML document signer.
///
/// Produces an enveloped signature over the element carrying the given ID
/// and inserts it right after that element's `Issuer`.
#[derive(Debug, Clone)]
pub struct XmlSigner {
    key: Arc<SigningKey>,
    certificate_der: Option<Vec<u8>>,
    config: SignatureConfig,
}

impl XmlSigner {
    /// Creates a new signer.
    #[must_use]
    pub fn new(key: Arc<SigningKey>) -> Self {
        Self {
            key,
            certificate_der: None,
            config: SignatureConfig::default(),
        }
    }

    /// Embeds an X.509 certificate in `KeyInfo`.
    #[must_use]
    pub fn with_certificate(mut self, certificate_der: Vec<u8>) -> Self {
        self.certificate_der = Some(certificate_der);
        self
    }

    /// Sets the signature configuration.
    #[must_use]
    pub fn with_config(mut self, config: SignatureConfig) -> Self {
        self.config = config;
        self
    }

    /// Signs an XML document.
    ///
    /// `reference_id` is the ID of the element to sign, without `#`.
    ///
    /// # Errors
    ///
    /// Returns an error if the element cannot be located or signing fails.
    pub fn sign(&self, xml: &str, reference_id: &str) -> SamlResult<String> {
        let rsa_algorithm = self.config.algorithm.rsa_algorithm().ok_or_else(|| {
            SamlError::SignatureCreation(format!(
                "refusing to sign with {}",
                self.config.algorithm.uri()
            ))
        })?;

        let (element_start, insert_position) = find_element_and_insert_position(xml, reference_id)?;

        let element = extract_element(xml, element_start)?;
        let canonical_element = canonicalize(&element, self.config.canonicalization)?;
        let digest = calculate_digest(&canonical_element, self.config.algorithm)?;
        let digest_b64 = base64::engine::general_purpose::STANDARD.encode(digest);

        let signed_info = signed_info_xml(
            &format!("#{reference_id}"),
            &digest_b64,
            self.config.algorithm,
            self.config.canonicalization,
        );

        let signature_value = self
            .key
            .sign(
                canonicalize(&signed_info, self.config.canonicalization)?.as_bytes(),
                rsa_algorithm,
            )
            .map_err(|e| SamlError::SignatureCreation(e.to_string()))?;
        let signature_b64 = base64::engine::general_purpose::STANDARD.encode(signature_value);

        let signature_element =
            build_signature_element(&signed_info, &signature_b64, self.certificate_der.as_deref());

        tracing::debug!(
            reference_id,
            algorithm = self.config.algorithm.uri(),
            "signed XML element"
        );

        Ok(format!(
            "{}{}{}",
            &xml[..insert_position],
            signature_element,
            &xml[insert_position..]
        ))
    }
}

/// Finds the element to sign and determines where to insert the signature.
fn find_element_and_insert_position(xml: &str, reference_id: &str) -> SamlResult<(usize, usize)> {
    let id_pattern = format!("ID=\"{reference_id}\"");

    let attr_pos = xml.find(&id_pattern).ok_or_else(|| {
        SamlError::SignatureCreation(format!("element with ID '{reference_id}' not found"))
    })?;

    let tag_start = xml[..attr_pos]
        .rfind('<')
        .ok_or_else(|| SamlError::SignatureCreation("malformed XML element".to_string()))?;

    let tag_end = xml[attr_pos..]
        .find('>')
        .map(|pos| attr_pos + pos + 1)
        .ok_or_else(|| SamlError::SignatureCreation("malformed XML element".to_string()))?;

    let insert_pos = find_issuer_end(xml, tag_end).unwrap_or(tag_end);

    Ok((tag_start, insert_pos))
}

/// Finds the end of an `Issuer` element that is the first child after `after`.
fn find_issuer_end(xml: &str, after: usize) -> Option<usize> {
    let rest = &xml[after..];
    if !rest.starts_with("<Issuer>") {
        return None;
    }
    rest.find("</Issuer>")
        .map(|pos| after + pos + "</Issuer>".len())
}

/// Extracts a complete XML element starting at the given position.
pub(super) fn extract_element(xml: &str, start: usize) -> SamlResult<String> {
    let name_end = xml[start + 1..]
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .map_or(xml.len(), |pos| start + 1 + pos);
    let tag_name = &xml[start + 1..name_end];

    let close_tag = format!("</{tag_name}>");
    let close_pos = xml[start..].find(&close_tag).ok_or_else(|| {
        SamlError::SignatureCreation(format!("unclosed XML element '{tag_name}'"))
    })?;

    Ok(xml[start..start + close_pos + close_tag.len()].to_string())
}

/// Builds the complete Signature element.
fn build_signature_element(
    signed_info: &str,
    signature_value: &str,
    certificate_der: Option<&[u8]>,
) -> String {
    let mut signature = format!(
        r#"<ds:Signature xmlns:ds="http://www.w3.org/2000/09/xmldsig#">{signed_info}<ds:SignatureValue>{signature_value}</ds:SignatureValue>"#
    );

    if let Some(cert) = certificate_der {
        let cert_b64 = base64::engine::general_purpose::STANDARD.encode(cert);
        signature.push_str(&format!(
            "<ds:KeyInfo><ds:X509Data><ds:X509Certificate>{cert_b64}</ds:X509Certificate></ds:X509Data></ds:KeyInfo>"
        ));
    }

    signature.push_str("</ds:Signature>");
    signature
}

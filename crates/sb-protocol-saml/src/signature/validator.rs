//! XML Signature extraction and reference checks.
//!
//! Parsing a signed document yields a [`SignedXml`]: the signature fields,
//! the document with the signature removed, and a digest check proving the
//! signature references (and covers) the whole document. Whether the
//! signature value itself is trusted is the trust engine's call, see
//! [`SignatureVerifier`](super::SignatureVerifier).

use base64::Engine;

use crate::error::{SamlError, SamlResult};

use super::{calculate_digest, canonicalize, CanonicalizationAlgorithm, SignatureAlgorithm, XmlSignature};

/// A document carrying an enveloped signature.
#[derive(Debug, Clone)]
pub struct SignedXml {
    signature: XmlSignature,
    unsigned_xml: String,
}

impl SignedXml {
    /// Extracts the enveloped signature from `xml`.
    ///
    /// Returns `Ok(None)` when the document is unsigned.
    ///
    /// # Errors
    ///
    /// Returns an error if a signature element is present but malformed.
    pub fn extract(xml: &str) -> SamlResult<Option<Self>> {
        if find_signature_start(xml).is_none() {
            return Ok(None);
        }
        let signature = extract_signature(xml)?;
        let unsigned_xml = remove_signature_element(xml);
        Ok(Some(Self {
            signature,
            unsigned_xml,
        }))
    }

    /// The parsed signature.
    #[must_use]
    pub const fn signature(&self) -> &XmlSignature {
        &self.signature
    }

    /// The document with the signature element removed.
    #[must_use]
    pub fn unsigned_xml(&self) -> &str {
        &self.unsigned_xml
    }

    /// Checks the reference digest.
    ///
    /// The referenced element must be the document root and span the whole
    /// document, so nothing outside the signed content can be parsed later.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::SignatureInvalid`] on any mismatch.
    pub fn verify_digest(&self) -> SamlResult<()> {
        if self.signature.algorithm.is_deprecated() {
            return Err(SamlError::SignatureInvalid(
                "SHA-1 signatures are not allowed".to_string(),
            ));
        }

        let document = strip_declaration(self.unsigned_xml.trim());
        let element = extract_referenced_element(document, self.signature.reference_id())?;
        if element != document {
            return Err(SamlError::SignatureInvalid(
                "signature does not cover the whole document".to_string(),
            ));
        }

        let calculated = canonicalize(element, self.signature.canonicalization)
            .and_then(|canonical| calculate_digest(&canonical, self.signature.algorithm))
            .map_err(|e| SamlError::SignatureInvalid(e.to_string()))?;
        let calculated_b64 = base64::engine::general_purpose::STANDARD.encode(calculated);

        if calculated_b64 != self.signature.digest_value {
            return Err(SamlError::SignatureInvalid("digest value mismatch".to_string()));
        }
        Ok(())
    }

    /// Decodes the signature value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not base64.
    pub fn signature_bytes(&self) -> SamlResult<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.signature.signature_value)
            .map_err(|e| SamlError::SignatureInvalid(format!("invalid signature encoding: {e}")))
    }
}

fn find_signature_start(xml: &str) -> Option<usize> {
    ["<ds:Signature ", "<ds:Signature>", "<Signature ", "<Signature>"]
        .iter()
        .filter_map(|pattern| xml.find(pattern))
        .min()
}

fn strip_declaration(xml: &str) -> &str {
    if xml.starts_with("<?xml") {
        if let Some(end) = xml.find("?>") {
            return xml[end + 2..].trim_start();
        }
    }
    xml
}

/// Extracts signature information from an XML document.
fn extract_signature(xml: &str) -> SamlResult<XmlSignature> {
    let algorithm_uri = extract_attribute(xml, "SignatureMethod", "Algorithm")
        .ok_or_else(|| SamlError::SignatureInvalid("no SignatureMethod".to_string()))?;
    let algorithm = SignatureAlgorithm::from_uri(&algorithm_uri).ok_or_else(|| {
        SamlError::SignatureInvalid(format!("unknown signature algorithm: {algorithm_uri}"))
    })?;

    let canonicalization_uri = extract_attribute(xml, "CanonicalizationMethod", "Algorithm")
        .ok_or_else(|| SamlError::SignatureInvalid("no CanonicalizationMethod".to_string()))?;
    let canonicalization =
        CanonicalizationAlgorithm::from_uri(&canonicalization_uri).ok_or_else(|| {
            SamlError::SignatureInvalid(format!(
                "unsupported canonicalization: {canonicalization_uri}"
            ))
        })?;

    let reference_uri = extract_attribute(xml, "Reference", "URI")
        .ok_or_else(|| SamlError::SignatureInvalid("no Reference URI found".to_string()))?;

    let digest_value = extract_element_content(xml, "DigestValue")
        .ok_or_else(|| SamlError::SignatureInvalid("no DigestValue found".to_string()))?;

    let signature_value = extract_element_content(xml, "SignatureValue")
        .ok_or_else(|| SamlError::SignatureInvalid("no SignatureValue found".to_string()))?;

    let x509_certificate = extract_element_content(xml, "X509Certificate");

    Ok(XmlSignature {
        algorithm,
        canonicalization,
        reference_uri,
        digest_value: strip_whitespace(&digest_value),
        signature_value: strip_whitespace(&signature_value),
        x509_certificate: x509_certificate.as_deref().map(strip_whitespace),
    })
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Extracts an attribute value from the first matching element.
fn extract_attribute(xml: &str, element: &str, attribute: &str) -> Option<String> {
    for pattern in [format!("<ds:{element} "), format!("<{element} ")] {
        if let Some(pos) = xml.find(&pattern) {
            let end = xml[pos..].find('>')?;
            let element_str = &xml[pos..pos + end];

            let attr_pattern = format!("{attribute}=\"");
            if let Some(attr_start) = element_str.find(&attr_pattern) {
                let value_start = attr_start + attr_pattern.len();
                let value_end = element_str[value_start..].find('"')?;
                return Some(element_str[value_start..value_start + value_end].to_string());
            }
        }
    }
    None
}

/// Extracts the text content of an XML element.
fn extract_element_content(xml: &str, element: &str) -> Option<String> {
    let patterns = [
        (format!("<ds:{element}>"), format!("</ds:{element}>")),
        (format!("<{element}>"), format!("</{element}>")),
    ];

    for (open, close) in &patterns {
        if let Some(start) = xml.find(open.as_str()) {
            let content_start = start + open.len();
            if let Some(end) = xml[content_start..].find(close.as_str()) {
                return Some(xml[content_start..content_start + end].to_string());
            }
        }
    }
    None
}

/// Extracts the element carrying `ID="reference_id"`.
fn extract_referenced_element<'a>(xml: &'a str, reference_id: &str) -> SamlResult<&'a str> {
    let id_pattern = format!("ID=\"{reference_id}\"");

    let pos = xml.find(&id_pattern).ok_or_else(|| {
        SamlError::SignatureInvalid(format!("referenced element '{reference_id}' not found"))
    })?;

    let start = xml[..pos].rfind('<').ok_or_else(|| {
        SamlError::SignatureInvalid("referenced element is malformed".to_string())
    })?;

    let name_end = xml[start + 1..]
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .map_or(xml.len(), |offset| start + 1 + offset);
    let tag_name = &xml[start + 1..name_end];
    let close_tag = format!("</{tag_name}>");

    let close_pos = xml[start..].rfind(&close_tag).ok_or_else(|| {
        SamlError::SignatureInvalid("referenced element is not properly closed".to_string())
    })?;

    Ok(&xml[start..start + close_pos + close_tag.len()])
}

/// Removes the first Signature element from XML content.
fn remove_signature_element(xml: &str) -> String {
    let patterns = [
        ("<ds:Signature", "</ds:Signature>"),
        ("<Signature", "</Signature>"),
    ];

    for (open, close) in &patterns {
        if let Some(start) = xml.find(open) {
            if let Some(end_offset) = xml[start..].find(close) {
                let end = start + end_offset + close.len();
                return format!("{}{}", &xml[..start], &xml[end..]);
            }
        }
    }
    xml.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use aws_lc_rs::rsa::KeySize;
    use sb_crypto::SigningKey;

    use crate::signature::XmlSigner;

    const DOC: &str = r#"<Response ID="_r1" Version="2.0"><Issuer>idp_saml2</Issuer><Status><StatusCode Value="ok"/></Status></Response>"#;

    fn signed_doc() -> String {
        let key = Arc::new(SigningKey::generate(KeySize::Rsa2048).unwrap());
        XmlSigner::new(key).sign(DOC, "_r1").unwrap()
    }

    #[test]
    fn unsigned_document_yields_none() {
        assert!(SignedXml::extract(DOC).unwrap().is_none());
    }

    #[test]
    fn extract_restores_unsigned_document() {
        let signed = SignedXml::extract(&signed_doc()).unwrap().unwrap();
        assert_eq!(signed.unsigned_xml(), DOC);
        assert_eq!(signed.signature().reference_id(), "_r1");
        assert_eq!(signed.signature().algorithm, SignatureAlgorithm::RsaSha256);
        assert!(signed.verify_digest().is_ok());
        assert!(!signed.signature_bytes().unwrap().is_empty());
    }

    #[test]
    fn tampering_breaks_digest() {
        let tampered = signed_doc().replace("<StatusCode Value=\"ok\"/>", "<StatusCode Value=\"no\"/>");
        let signed = SignedXml::extract(&tampered).unwrap().unwrap();
        assert!(signed.verify_digest().is_err());
    }

    #[test]
    fn whitespace_inside_text_breaks_digest() {
        let doc = r#"<Response ID="_r2" Version="2.0"><Issuer>idp_saml2</Issuer><NameID>alice smith</NameID></Response>"#;
        let key = Arc::new(SigningKey::generate(KeySize::Rsa2048).unwrap());
        let tampered = XmlSigner::new(key)
            .sign(doc, "_r2")
            .unwrap()
            .replace("alice smith", "alice    smith");

        let signed = SignedXml::extract(&tampered).unwrap().unwrap();
        assert!(signed.verify_digest().is_err());
    }

    #[test]
    fn inclusive_canonicalization_is_refused() {
        let inclusive = signed_doc().replace(
            r#"<ds:CanonicalizationMethod Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"/>"#,
            r#"<ds:CanonicalizationMethod Algorithm="http://www.w3.org/TR/2001/REC-xml-c14n-20010315"/>"#,
        );
        assert!(SignedXml::extract(&inclusive).is_err());
    }

    #[test]
    fn wrapped_content_is_rejected() {
        let wrapped = format!("<Wrapper>{}</Wrapper>", signed_doc());
        let signed = SignedXml::extract(&wrapped).unwrap().unwrap();
        assert!(signed.verify_digest().is_err());
    }

    #[test]
    fn extract_attribute_from_xml() {
        let xml = r##"<ds:Reference URI="#_123"></ds:Reference>"##;
        assert_eq!(extract_attribute(xml, "Reference", "URI").as_deref(), Some("#_123"));
    }

    #[test]
    fn extract_element_content_from_xml() {
        let xml = "<ds:DigestValue>abc123</ds:DigestValue>";
        assert_eq!(extract_element_content(xml, "DigestValue").as_deref(), Some("abc123"));
    }

    #[test]
    fn remove_signature() {
        let xml = "<Root><ds:Signature>sig</ds:Signature><Data>content</Data></Root>";
        let without_sig = remove_signature_element(xml);
        assert_eq!(without_sig, "<Root><Data>content</Data></Root>");
    }

    #[test]
    fn declaration_is_ignored() {
        assert_eq!(strip_declaration("<?xml version=\"1.0\"?>\n<A/>"), "<A/>");
        assert_eq!(strip_declaration("<A/>"), "<A/>");
    }
}

//! XML Signature support for SAML.
//!
//! Enveloped XML-DSig over the `Response` element, plus the trust-engine
//! orchestration that decides whether a signature is good for a given
//! identity provider.
//!
//! # Signing Algorithms
//!
//! - RSA-SHA256 (default)
//! - RSA-SHA384
//! - RSA-SHA512
//!
//! RSA-SHA1 is recognised so it can be named in errors, never accepted.

mod signer;
mod trust_engine;
mod validator;
mod verifier;

pub use signer::*;
pub use trust_engine::*;
pub use validator::*;
pub use verifier::*;

use sb_crypto::RsaSignatureAlgorithm;
use xml_canonicalization::Canonicalizer;

use crate::error::{SamlError, SamlResult};

/// Signature algorithm URIs.
pub mod signature_algorithms {
    /// RSA with SHA-256.
    pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
    /// RSA with SHA-384.
    pub const RSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384";
    /// RSA with SHA-512.
    pub const RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";
    /// RSA with SHA-1.
    pub const RSA_SHA1: &str = "http://www.w3.org/2000/09/xmldsig#rsa-sha1";
}

/// Digest algorithm URIs.
pub mod digest_algorithms {
    /// SHA-256.
    pub const SHA256: &str = "http://www.w3.org/2001/04/xmlenc#sha256";
    /// SHA-384.
    pub const SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#sha384";
    /// SHA-512.
    pub const SHA512: &str = "http://www.w3.org/2001/04/xmlenc#sha512";
    /// SHA-1.
    pub const SHA1: &str = "http://www.w3.org/2000/09/xmldsig#sha1";
}

/// Canonicalization algorithm URIs.
pub mod canonicalization_algorithms {
    /// Exclusive C14N without comments.
    pub const EXCLUSIVE_C14N: &str = "http://www.w3.org/2001/10/xml-exc-c14n#";
}

/// Enveloped signature transform URI.
pub const ENVELOPED_SIGNATURE_TRANSFORM: &str =
    "http://www.w3.org/2000/09/xmldsig#enveloped-signature";

/// Signature algorithm selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SignatureAlgorithm {
    /// RSA with SHA-256.
    #[default]
    RsaSha256,
    /// RSA with SHA-384.
    RsaSha384,
    /// RSA with SHA-512.
    RsaSha512,
    /// Legacy RSA with SHA-1. Parsed, never verified.
    RsaSha1,
}

impl SignatureAlgorithm {
    /// Returns the URI for this signature algorithm.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::RsaSha256 => signature_algorithms::RSA_SHA256,
            Self::RsaSha384 => signature_algorithms::RSA_SHA384,
            Self::RsaSha512 => signature_algorithms::RSA_SHA512,
            Self::RsaSha1 => signature_algorithms::RSA_SHA1,
        }
    }

    /// Returns the corresponding digest algorithm URI.
    #[must_use]
    pub const fn digest_uri(&self) -> &'static str {
        match self {
            Self::RsaSha256 => digest_algorithms::SHA256,
            Self::RsaSha384 => digest_algorithms::SHA384,
            Self::RsaSha512 => digest_algorithms::SHA512,
            Self::RsaSha1 => digest_algorithms::SHA1,
        }
    }

    /// Parses a signature algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            signature_algorithms::RSA_SHA256 => Some(Self::RsaSha256),
            signature_algorithms::RSA_SHA384 => Some(Self::RsaSha384),
            signature_algorithms::RSA_SHA512 => Some(Self::RsaSha512),
            signature_algorithms::RSA_SHA1 => Some(Self::RsaSha1),
            _ => None,
        }
    }

    /// Returns true if this algorithm uses a deprecated hash (SHA-1).
    #[must_use]
    pub const fn is_deprecated(&self) -> bool {
        matches!(self, Self::RsaSha1)
    }

    /// The crypto-layer algorithm, or `None` for SHA-1.
    #[must_use]
    pub const fn rsa_algorithm(&self) -> Option<RsaSignatureAlgorithm> {
        match self {
            Self::RsaSha256 => Some(RsaSignatureAlgorithm::RsaSha256),
            Self::RsaSha384 => Some(RsaSignatureAlgorithm::RsaSha384),
            Self::RsaSha512 => Some(RsaSignatureAlgorithm::RsaSha512),
            Self::RsaSha1 => None,
        }
    }
}

/// Canonicalization algorithm selection.
///
/// Only exclusive C14N without comments is produced or accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CanonicalizationAlgorithm {
    /// Exclusive C14N without comments.
    #[default]
    ExclusiveC14N,
}

impl CanonicalizationAlgorithm {
    /// Returns the URI for this canonicalization algorithm.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::ExclusiveC14N => canonicalization_algorithms::EXCLUSIVE_C14N,
        }
    }

    /// Parses a canonicalization algorithm from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            canonicalization_algorithms::EXCLUSIVE_C14N => Some(Self::ExclusiveC14N),
            _ => None,
        }
    }
}

/// XML Signature structure.
///
/// Represents the `<ds:Signature>` element in a signed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlSignature {
    /// The signature algorithm used.
    pub algorithm: SignatureAlgorithm,
    /// The canonicalization algorithm used.
    pub canonicalization: CanonicalizationAlgorithm,
    /// The reference URI (`#` followed by the ID of the signed element).
    pub reference_uri: String,
    /// The digest value (base64 encoded).
    pub digest_value: String,
    /// The signature value (base64 encoded).
    pub signature_value: String,
    /// Optional X.509 certificate (base64 encoded, DER format).
    pub x509_certificate: Option<String>,
}

impl XmlSignature {
    /// The referenced element ID, without the leading `#`.
    #[must_use]
    pub fn reference_id(&self) -> &str {
        self.reference_uri
            .strip_prefix('#')
            .unwrap_or(&self.reference_uri)
    }

    /// The canonical `SignedInfo` bytes the signature value covers.
    ///
    /// # Errors
    ///
    /// Returns an error if the rebuilt `SignedInfo` cannot be canonicalized.
    pub fn canonical_signed_info(&self) -> SamlResult<String> {
        canonicalize(
            &signed_info_xml(
                &self.reference_uri,
                &self.digest_value,
                self.algorithm,
                self.canonicalization,
            ),
            self.canonicalization,
        )
    }
}

/// Configuration for signature creation.
#[derive(Debug, Clone, Default)]
pub struct SignatureConfig {
    /// The signature algorithm to use.
    pub algorithm: SignatureAlgorithm,
    /// The canonicalization algorithm to use.
    pub canonicalization: CanonicalizationAlgorithm,
}

impl SignatureConfig {
    /// Creates a new signature configuration with the given algorithm.
    #[must_use]
    pub const fn with_algorithm(algorithm: SignatureAlgorithm) -> Self {
        Self {
            algorithm,
            canonicalization: CanonicalizationAlgorithm::ExclusiveC14N,
        }
    }
}

/// Builds the `SignedInfo` element. Signer and validator share this so the
/// signed bytes are reproduced exactly.
fn signed_info_xml(
    reference_uri: &str,
    digest_b64: &str,
    algorithm: SignatureAlgorithm,
    canonicalization: CanonicalizationAlgorithm,
) -> String {
    format!(
        r#"<ds:SignedInfo xmlns:ds="http://www.w3.org/2000/09/xmldsig#">
<ds:CanonicalizationMethod Algorithm="{c14n}"/>
<ds:SignatureMethod Algorithm="{sig}"/>
<ds:Reference URI="{reference_uri}">
<ds:Transforms>
<ds:Transform Algorithm="{ENVELOPED_SIGNATURE_TRANSFORM}"/>
<ds:Transform Algorithm="{c14n}"/>
</ds:Transforms>
<ds:DigestMethod Algorithm="{digest}"/>
<ds:DigestValue>{digest_b64}</ds:DigestValue>
</ds:Reference>
</ds:SignedInfo>"#,
        c14n = canonicalization.uri(),
        sig = algorithm.uri(),
        digest = algorithm.digest_uri(),
    )
}

/// Canonicalizes an element. Text and attribute values keep their exact
/// whitespace, so any edit to signed content changes the digest.
fn canonicalize(xml: &str, algorithm: CanonicalizationAlgorithm) -> SamlResult<String> {
    let with_comments = match algorithm {
        CanonicalizationAlgorithm::ExclusiveC14N => false,
    };

    let mut output = Vec::new();
    Canonicalizer::read_from_str(xml)
        .write_to_writer(&mut output)
        .canonicalize(with_comments)
        .map_err(|e| SamlError::XmlParse(format!("canonicalization failed: {e}")))?;

    String::from_utf8(output)
        .map_err(|e| SamlError::XmlParse(format!("canonical XML is not UTF-8: {e}")))
}

/// Calculates the digest of canonical data.
fn calculate_digest(data: &str, algorithm: SignatureAlgorithm) -> SamlResult<Vec<u8>> {
    match algorithm {
        SignatureAlgorithm::RsaSha256 => Ok(sb_crypto::sha256(data.as_bytes())),
        SignatureAlgorithm::RsaSha384 => Ok(sb_crypto::sha384(data.as_bytes())),
        SignatureAlgorithm::RsaSha512 => Ok(sb_crypto::sha512(data.as_bytes())),
        SignatureAlgorithm::RsaSha1 => Err(SamlError::UnsupportedAlgorithm(
            "SHA-1 digests are not accepted".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_algorithm_uri_roundtrip() {
        for alg in [
            SignatureAlgorithm::RsaSha256,
            SignatureAlgorithm::RsaSha384,
            SignatureAlgorithm::RsaSha512,
            SignatureAlgorithm::RsaSha1,
        ] {
            assert_eq!(SignatureAlgorithm::from_uri(alg.uri()), Some(alg));
        }
    }

    #[test]
    fn sha1_has_no_crypto_mapping() {
        assert!(SignatureAlgorithm::RsaSha1.is_deprecated());
        assert!(SignatureAlgorithm::RsaSha1.rsa_algorithm().is_none());
        assert_eq!(
            SignatureAlgorithm::RsaSha512.rsa_algorithm(),
            Some(RsaSignatureAlgorithm::RsaSha512)
        );
    }

    #[test]
    fn only_exclusive_c14n_is_recognised() {
        let exclusive = CanonicalizationAlgorithm::ExclusiveC14N;
        assert_eq!(CanonicalizationAlgorithm::from_uri(exclusive.uri()), Some(exclusive));
        assert_eq!(
            CanonicalizationAlgorithm::from_uri("http://www.w3.org/TR/2001/REC-xml-c14n-20010315"),
            None
        );
    }

    #[test]
    fn canonical_form_keeps_text_whitespace() {
        let exclusive = CanonicalizationAlgorithm::ExclusiveC14N;
        let narrow = canonicalize("<NameID>alice smith</NameID>", exclusive).unwrap();
        let wide = canonicalize("<NameID>alice    smith</NameID>", exclusive).unwrap();
        assert_ne!(narrow, wide);
        assert!(wide.contains("alice    smith"));
    }

    #[test]
    fn signed_info_names_reference() {
        let xml = signed_info_xml(
            "#_r1",
            "ZGlnZXN0",
            SignatureAlgorithm::RsaSha256,
            CanonicalizationAlgorithm::ExclusiveC14N,
        );
        assert!(xml.contains(r##"URI="#_r1""##));
        assert!(xml.contains("<ds:DigestValue>ZGlnZXN0</ds:DigestValue>"));
        assert!(xml.contains(signature_algorithms::RSA_SHA256));
    }
}

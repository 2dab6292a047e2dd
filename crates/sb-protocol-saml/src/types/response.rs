//! SAML Response types.
//!
//! Response messages sent by an identity provider to a service provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Assertion, SamlVersion, Status};

/// SAML Response.
///
/// Field order matters on the wire: the enveloped signature is inserted
/// directly after `Issuer`, so `Issuer` must precede everything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "Response")]
pub struct Response {
    /// Unique identifier for this response.
    #[serde(rename = "@ID")]
    pub id: String,

    /// Protocol version.
    #[serde(rename = "@Version")]
    pub version: String,

    /// Timestamp when this response was issued.
    #[serde(rename = "@IssueInstant")]
    pub issue_instant: DateTime<Utc>,

    /// The ID of the request this response is for.
    #[serde(rename = "@InResponseTo", default, skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,

    /// The URL where this response was sent.
    #[serde(rename = "@Destination", default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// Entity ID of the issuing identity provider.
    #[serde(rename = "Issuer", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// The status of the response.
    #[serde(rename = "Status")]
    pub status: Status,

    /// Plaintext assertions.
    #[serde(rename = "Assertion", default, skip_serializing_if = "Vec::is_empty")]
    pub assertions: Vec<Assertion>,

    /// Encrypted assertions.
    #[serde(rename = "EncryptedAssertion", default, skip_serializing_if = "Vec::is_empty")]
    pub encrypted_assertions: Vec<EncryptedAssertion>,
}

impl Response {
    /// Creates an empty success response.
    #[must_use]
    pub fn success(id: impl Into<String>, version: SamlVersion, issue_instant: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            version: version.as_str().to_string(),
            issue_instant,
            in_response_to: None,
            destination: None,
            issuer: None,
            status: Status::success(),
            assertions: Vec::new(),
            encrypted_assertions: Vec::new(),
        }
    }

    /// Sets the issuer.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Sets the request ID this response is for.
    #[must_use]
    pub fn in_response_to(mut self, request_id: impl Into<String>) -> Self {
        self.in_response_to = Some(request_id.into());
        self
    }

    /// Sets the destination URL.
    #[must_use]
    pub fn with_destination(mut self, url: impl Into<String>) -> Self {
        self.destination = Some(url.into());
        self
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Adds an assertion to this response.
    #[must_use]
    pub fn with_assertion(mut self, assertion: Assertion) -> Self {
        self.assertions.push(assertion);
        self
    }

    /// Adds an encrypted assertion to this response.
    #[must_use]
    pub fn with_encrypted_assertion(mut self, assertion: EncryptedAssertion) -> Self {
        self.encrypted_assertions.push(assertion);
        self
    }

    /// Returns true if this response indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Gets the first plaintext assertion if present.
    #[must_use]
    pub fn first_assertion(&self) -> Option<&Assertion> {
        self.assertions.first()
    }

    /// Gets the first encrypted assertion if present.
    #[must_use]
    pub fn first_encrypted_assertion(&self) -> Option<&EncryptedAssertion> {
        self.encrypted_assertions.first()
    }
}

/// XML-Enc wrapper around an encrypted `Assertion` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedAssertion {
    /// The encrypted data.
    #[serde(rename = "EncryptedData")]
    pub encrypted_data: EncryptedData,
}

/// Encrypted data structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedData {
    /// What was encrypted (an element).
    #[serde(rename = "@Type", default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,

    /// Content encryption algorithm.
    #[serde(rename = "EncryptionMethod")]
    pub encryption_method: EncryptionMethod,

    /// Key info for decryption.
    #[serde(rename = "KeyInfo")]
    pub key_info: KeyInfo,

    /// The cipher data: base64 of nonce followed by ciphertext and tag.
    #[serde(rename = "CipherData")]
    pub cipher_data: CipherData,
}

/// Algorithm reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionMethod {
    /// Algorithm URI.
    #[serde(rename = "@Algorithm")]
    pub algorithm: String,
}

/// Key information for decryption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    /// The wrapped content key.
    #[serde(rename = "EncryptedKey")]
    pub encrypted_key: EncryptedKey,
}

/// Encrypted key data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedKey {
    /// Key transport algorithm.
    #[serde(rename = "EncryptionMethod")]
    pub encryption_method: EncryptionMethod,

    /// The cipher data containing the wrapped key.
    #[serde(rename = "CipherData")]
    pub cipher_data: CipherData,
}

/// Cipher data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CipherData {
    /// The cipher value (base64 encoded).
    #[serde(rename = "CipherValue")]
    pub cipher_value: String,
}

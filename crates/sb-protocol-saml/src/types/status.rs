//! SAML Status types.
//!
//! Status information returned in SAML protocol responses.

use serde::{Deserialize, Serialize};

use super::status_codes;

/// SAML protocol status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// The status code.
    #[serde(rename = "StatusCode")]
    pub status_code: StatusCode,

    /// Optional status message.
    #[serde(rename = "StatusMessage", default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl Status {
    /// Creates a success status.
    #[must_use]
    pub fn success() -> Self {
        Self {
            status_code: StatusCode::new(status_codes::SUCCESS),
            status_message: None,
        }
    }

    /// Creates a responder error status.
    #[must_use]
    pub fn responder_error(message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::new(status_codes::RESPONDER),
            status_message: Some(message.into()),
        }
    }

    /// Returns true if this status indicates success in either protocol version.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status_code.is_success()
    }

    /// Short description for logs and failure details, with the nested
    /// sub-code when the issuer sent one.
    #[must_use]
    pub fn describe(&self) -> String {
        let code = match &self.status_code.status_code {
            Some(sub) => format!("{}/{}", self.status_code.value, sub.value),
            None => self.status_code.value.clone(),
        };
        match &self.status_message {
            Some(message) => format!("{code} ({message})"),
            None => code,
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::success()
    }
}

/// SAML status code, optionally nesting a more specific sub-code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCode {
    /// The status code value.
    #[serde(rename = "@Value")]
    pub value: String,

    /// Optional nested status code providing more detail.
    #[serde(rename = "StatusCode", default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<Box<StatusCode>>,
}

impl StatusCode {
    /// Creates a new status code with the given value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            status_code: None,
        }
    }

    /// Returns true for the SAML 2.0 or SAML 1.1 success code.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.value == status_codes::SUCCESS || self.value == status_codes::SAML11_SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_success() {
        let status = Status::success();
        assert!(status.is_success());
        assert!(status.status_message.is_none());
    }

    #[test]
    fn saml11_success_is_success() {
        let status = Status {
            status_code: StatusCode::new(status_codes::SAML11_SUCCESS),
            status_message: None,
        };
        assert!(status.is_success());
    }

    #[test]
    fn status_error_describe() {
        let status = Status::responder_error("backend unavailable");
        assert!(!status.is_success());
        assert_eq!(
            status.describe(),
            "urn:oasis:names:tc:SAML:2.0:status:Responder (backend unavailable)"
        );
    }

    #[test]
    fn describe_includes_sub_code() {
        let status = Status {
            status_code: StatusCode {
                value: status_codes::RESPONDER.to_string(),
                status_code: Some(Box::new(StatusCode::new(
                    "urn:oasis:names:tc:SAML:2.0:status:AuthnFailed",
                ))),
            },
            status_message: None,
        };
        assert_eq!(
            status.describe(),
            "urn:oasis:names:tc:SAML:2.0:status:Responder/urn:oasis:names:tc:SAML:2.0:status:AuthnFailed"
        );
    }
}

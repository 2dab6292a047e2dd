//! SAML constants and URIs.

// ============================================================================
// Namespaces
// ============================================================================

/// `Type` of an `EncryptedData` element that wraps a whole element.
pub const XMLENC_ELEMENT_TYPE: &str = "http://www.w3.org/2001/04/xmlenc#Element";

// ============================================================================
// Binding URIs
// ============================================================================

/// SAML binding types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamlBinding {
    /// HTTP POST binding.
    #[default]
    HttpPost,
    /// HTTP Redirect binding.
    HttpRedirect,
}

impl SamlBinding {
    /// Returns the URI for this binding.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::HttpPost => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST",
            Self::HttpRedirect => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect",
        }
    }

    /// Returns the short binding name used in configuration files.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::HttpPost => "HTTP-POST",
            Self::HttpRedirect => "HTTP-Redirect",
        }
    }

    /// Parses a binding from its URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" => Some(Self::HttpPost),
            "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect" => Some(Self::HttpRedirect),
            _ => None,
        }
    }

    /// Parses a binding from either its short name or its URI.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "HTTP-POST" => Some(Self::HttpPost),
            "HTTP-Redirect" => Some(Self::HttpRedirect),
            other => Self::from_uri(other),
        }
    }
}

impl std::fmt::Display for SamlBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Authentication Context Classes
// ============================================================================

/// SAML authentication context class references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthnContextClass {
    /// Password-based authentication.
    Password,
    /// Password protected transport (TLS + password).
    PasswordProtectedTransport,
}

impl AuthnContextClass {
    /// Returns the URI for this authentication context class.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::Password => "urn:oasis:names:tc:SAML:2.0:ac:classes:Password",
            Self::PasswordProtectedTransport => {
                "urn:oasis:names:tc:SAML:2.0:ac:classes:PasswordProtectedTransport"
            }
        }
    }
}

// ============================================================================
// Status Codes
// ============================================================================

/// Top-level SAML status codes.
pub mod status_codes {
    /// SAML 2.0 success.
    pub const SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";

    /// The request could not be performed due to an error on the responder side.
    pub const RESPONDER: &str = "urn:oasis:names:tc:SAML:2.0:status:Responder";

    /// SAML 1.1 success (a QName in the protocol namespace).
    pub const SAML11_SUCCESS: &str = "samlp:Success";
}

// ============================================================================
// Confirmation methods
// ============================================================================

/// Subject confirmation method URIs.
pub mod confirmation_methods {
    /// SAML 2.0 bearer.
    pub const BEARER: &str = "urn:oasis:names:tc:SAML:2.0:cm:bearer";

    /// SAML 1.1 bearer.
    pub const SAML11_BEARER: &str = "urn:oasis:names:tc:SAML:1.0:cm:bearer";
}

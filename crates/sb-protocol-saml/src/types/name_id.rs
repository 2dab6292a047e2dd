//! SAML Name ID types.
//!
//! Name identifiers are used to identify subjects in SAML assertions.

use serde::{Deserialize, Serialize};

/// SAML Name ID.
///
/// Represents the identifier of a subject in a SAML assertion. On the wire
/// this is `<NameID Format="...">value</NameID>` (SAML 1.1 calls the element
/// `NameIdentifier`; both map to this type).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameId {
    /// The format of the name identifier.
    #[serde(rename = "@Format", default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// The security or administrative domain that qualifies the name.
    #[serde(rename = "@NameQualifier", default, skip_serializing_if = "Option::is_none")]
    pub name_qualifier: Option<String>,

    /// The actual identifier value.
    #[serde(rename = "$text", default)]
    pub value: String,
}

impl NameId {
    /// Creates a new name ID with the given value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            format: None,
            name_qualifier: None,
            value: value.into(),
        }
    }

    /// Returns the value when it is not blank.
    #[must_use]
    pub fn non_blank_value(&self) -> Option<&str> {
        let trimmed = self.value.trim();
        (!trimmed.is_empty()).then_some(self.value.as_str())
    }
}

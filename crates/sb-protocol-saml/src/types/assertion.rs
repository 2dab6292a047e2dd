//! SAML Assertion types.
//!
//! Assertions contain statements about a subject made by an issuer. One
//! model serves both protocol versions: SAML 2.0 puts the subject on the
//! assertion itself, SAML 1.1 repeats it inside each statement.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{confirmation_methods, AuthnContextClass, NameId, SamlVersion};

/// Attribute name to values.
pub type AttributeMap = BTreeMap<String, Vec<String>>;

/// SAML Assertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "Assertion")]
pub struct Assertion {
    /// Unique identifier for this assertion.
    #[serde(rename = "@ID")]
    pub id: String,

    /// Protocol version, as carried in the `Version` attribute.
    #[serde(rename = "@Version")]
    pub version: String,

    /// Timestamp when this assertion was issued.
    #[serde(rename = "@IssueInstant")]
    pub issue_instant: DateTime<Utc>,

    /// SAML 1.1 issuer, carried as the `Issuer` attribute.
    #[serde(rename = "@Issuer", default, skip_serializing_if = "Option::is_none")]
    pub issuer_attribute: Option<String>,

    /// SAML 2.0 issuer, carried as the `Issuer` element.
    #[serde(rename = "Issuer", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    /// The subject (SAML 2.0).
    #[serde(rename = "Subject", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    /// Conditions that must be evaluated for the assertion to be valid.
    #[serde(rename = "Conditions", default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,

    /// Authentication statement describing how the subject authenticated.
    #[serde(rename = "AuthnStatement", default, skip_serializing_if = "Option::is_none")]
    pub authn_statement: Option<AuthnStatement>,

    /// Attribute statement containing attributes about the subject.
    #[serde(rename = "AttributeStatement", default, skip_serializing_if = "Option::is_none")]
    pub attribute_statement: Option<AttributeStatement>,
}

impl Assertion {
    /// Creates an empty assertion with the given identifier.
    #[must_use]
    pub fn new(id: impl Into<String>, version: SamlVersion, issue_instant: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            version: version.as_str().to_string(),
            issue_instant,
            issuer_attribute: None,
            issuer: None,
            subject: None,
            conditions: None,
            authn_statement: None,
            attribute_statement: None,
        }
    }

    /// Sets the issuer where this assertion's protocol version keeps it:
    /// the `Issuer` attribute for 1.x, the `Issuer` element otherwise.
    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        if SamlVersion::major_of(&self.version) == Some(1) {
            self.issuer_attribute = Some(issuer.into());
        } else {
            self.issuer = Some(issuer.into());
        }
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Sets the conditions.
    #[must_use]
    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    /// Sets the authentication statement.
    #[must_use]
    pub fn with_authn_statement(mut self, statement: AuthnStatement) -> Self {
        self.authn_statement = Some(statement);
        self
    }

    /// Sets the attribute statement.
    #[must_use]
    pub fn with_attribute_statement(mut self, statement: AttributeStatement) -> Self {
        self.attribute_statement = Some(statement);
        self
    }

    /// The assertion-level subject name identifier.
    #[must_use]
    pub fn subject_name_id(&self) -> Option<&NameId> {
        self.subject.as_ref().and_then(|s| s.name_id.as_ref())
    }

    /// The first statement-level subject name identifier.
    #[must_use]
    pub fn statement_name_id(&self) -> Option<&NameId> {
        let from_authn = self
            .authn_statement
            .as_ref()
            .and_then(|s| s.subject.as_ref())
            .and_then(|s| s.name_id.as_ref());
        from_authn.or_else(|| {
            self.attribute_statement
                .as_ref()
                .and_then(|s| s.subject.as_ref())
                .and_then(|s| s.name_id.as_ref())
        })
    }

    /// Returns `(notBefore, notOnOrAfter)`.
    #[must_use]
    pub fn validity_window(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        self.conditions
            .as_ref()
            .map_or((None, None), |c| (c.not_before, c.not_on_or_after))
    }

    /// Collects the attribute statement into a map.
    #[must_use]
    pub fn attributes(&self) -> AttributeMap {
        let mut map = AttributeMap::new();
        if let Some(statement) = &self.attribute_statement {
            for attribute in &statement.attributes {
                map.entry(attribute.name.clone())
                    .or_default()
                    .extend(attribute.values.iter().cloned());
            }
        }
        map
    }
}

/// Subject of an assertion or statement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Subject {
    /// The name identifier for the subject.
    #[serde(rename = "NameID", alias = "NameIdentifier", default, skip_serializing_if = "Option::is_none")]
    pub name_id: Option<NameId>,

    /// Subject confirmation data.
    #[serde(rename = "SubjectConfirmation", default, skip_serializing_if = "Vec::is_empty")]
    pub subject_confirmations: Vec<SubjectConfirmation>,
}

impl Subject {
    /// Creates a new subject with a name ID.
    #[must_use]
    pub fn new(name_id: NameId) -> Self {
        Self {
            name_id: Some(name_id),
            subject_confirmations: Vec::new(),
        }
    }

    /// Adds a subject confirmation.
    #[must_use]
    pub fn with_confirmation(mut self, confirmation: SubjectConfirmation) -> Self {
        self.subject_confirmations.push(confirmation);
        self
    }
}

/// Subject confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectConfirmation {
    /// The confirmation method.
    #[serde(rename = "@Method")]
    pub method: String,

    /// Additional confirmation data.
    #[serde(rename = "SubjectConfirmationData", default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SubjectConfirmationData>,
}

impl SubjectConfirmation {
    /// Creates a bearer confirmation for the given protocol version.
    #[must_use]
    pub fn bearer(version: SamlVersion) -> Self {
        let method = match version {
            SamlVersion::V1_1 => confirmation_methods::SAML11_BEARER,
            SamlVersion::V2_0 => confirmation_methods::BEARER,
        };
        Self {
            method: method.to_string(),
            data: None,
        }
    }

    /// Sets the confirmation data.
    #[must_use]
    pub fn with_data(mut self, data: SubjectConfirmationData) -> Self {
        self.data = Some(data);
        self
    }
}

/// Subject confirmation data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubjectConfirmationData {
    /// The request ID that this assertion responds to.
    #[serde(rename = "@InResponseTo", default, skip_serializing_if = "Option::is_none")]
    pub in_response_to: Option<String>,

    /// Time after which the subject can no longer be confirmed.
    #[serde(rename = "@NotOnOrAfter", default, skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,

    /// The location to which the assertion can be presented.
    #[serde(rename = "@Recipient", default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

/// Conditions for assertion validity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Conditions {
    /// Time before which the assertion is not valid.
    #[serde(rename = "@NotBefore", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<DateTime<Utc>>,

    /// Time at or after which the assertion is not valid.
    #[serde(rename = "@NotOnOrAfter", default, skip_serializing_if = "Option::is_none")]
    pub not_on_or_after: Option<DateTime<Utc>>,

    /// Audience restrictions.
    #[serde(rename = "AudienceRestriction", default, skip_serializing_if = "Vec::is_empty")]
    pub audience_restrictions: Vec<AudienceRestriction>,
}

impl Conditions {
    /// Creates conditions for the half-open window `[not_before, not_on_or_after)`.
    #[must_use]
    pub const fn window(not_before: DateTime<Utc>, not_on_or_after: DateTime<Utc>) -> Self {
        Self {
            not_before: Some(not_before),
            not_on_or_after: Some(not_on_or_after),
            audience_restrictions: Vec::new(),
        }
    }

    /// Adds an audience restriction.
    #[must_use]
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience_restrictions.push(AudienceRestriction {
            audiences: vec![audience.into()],
        });
        self
    }
}

/// Audience restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AudienceRestriction {
    /// List of valid audiences.
    #[serde(rename = "Audience", default)]
    pub audiences: Vec<String>,
}

/// Authentication statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthnStatement {
    /// When the subject authenticated.
    #[serde(rename = "@AuthnInstant")]
    pub authn_instant: DateTime<Utc>,

    /// Session index at the identity provider.
    #[serde(rename = "@SessionIndex", default, skip_serializing_if = "Option::is_none")]
    pub session_index: Option<String>,

    /// Statement subject (SAML 1.1).
    #[serde(rename = "Subject", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    /// Authentication context.
    #[serde(rename = "AuthnContext", default, skip_serializing_if = "Option::is_none")]
    pub authn_context: Option<AuthnContext>,
}

impl AuthnStatement {
    /// Creates a statement for an authentication at `instant`.
    #[must_use]
    pub fn new(instant: DateTime<Utc>, context_class: AuthnContextClass) -> Self {
        Self {
            authn_instant: instant,
            session_index: None,
            subject: None,
            authn_context: Some(AuthnContext {
                class_ref: Some(context_class.uri().to_string()),
            }),
        }
    }

    /// Sets the statement subject.
    #[must_use]
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }
}

/// Authentication context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthnContext {
    /// Authentication context class reference.
    #[serde(rename = "AuthnContextClassRef", default, skip_serializing_if = "Option::is_none")]
    pub class_ref: Option<String>,
}

/// Attribute statement.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttributeStatement {
    /// Statement subject (SAML 1.1).
    #[serde(rename = "Subject", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,

    /// The attributes.
    #[serde(rename = "Attribute", default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

impl AttributeStatement {
    /// Builds a statement from an attribute map.
    #[must_use]
    pub fn from_map(attributes: &AttributeMap) -> Self {
        Self {
            subject: None,
            attributes: attributes
                .iter()
                .map(|(name, values)| Attribute::multi(name.clone(), values.clone()))
                .collect(),
        }
    }

    /// Sets the statement subject.
    #[must_use]
    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }
}

/// A named, possibly multi-valued attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name.
    #[serde(rename = "@Name")]
    pub name: String,

    /// Attribute values.
    #[serde(rename = "AttributeValue", default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl Attribute {
    /// Creates a single-valued attribute.
    #[must_use]
    pub fn single(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: vec![value.into()],
        }
    }

    /// Creates a multi-valued attribute.
    #[must_use]
    pub fn multi(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(now: DateTime<Utc>) -> Assertion {
        Assertion::new("_a1", SamlVersion::V2_0, now)
            .with_issuer("idp_saml2")
            .with_subject(Subject::new(NameId::new("189502")))
            .with_conditions(Conditions::window(now, now + Duration::minutes(30)))
    }

    #[test]
    fn assertion_accessors() {
        let now = Utc::now();
        let assertion = sample(now);

        assert_eq!(assertion.version, "2.0");
        assert_eq!(assertion.subject_name_id().map(|n| n.value.as_str()), Some("189502"));
        assert!(assertion.statement_name_id().is_none());
        assert_eq!(
            assertion.validity_window(),
            (Some(now), Some(now + Duration::minutes(30)))
        );
    }

    #[test]
    fn statement_subject_prefers_authn_statement() {
        let now = Utc::now();
        let assertion = Assertion::new("_a2", SamlVersion::V1_1, now)
            .with_authn_statement(
                AuthnStatement::new(now, AuthnContextClass::Password)
                    .with_subject(Subject::new(NameId::new("from-authn"))),
            )
            .with_attribute_statement(
                AttributeStatement::default().with_subject(Subject::new(NameId::new("from-attr"))),
            );

        assert_eq!(
            assertion.statement_name_id().map(|n| n.value.as_str()),
            Some("from-authn")
        );
    }

    #[test]
    fn attributes_collect_into_map() {
        let mut map = AttributeMap::new();
        map.insert("role".to_string(), vec!["admin".to_string(), "user".to_string()]);
        map.insert("mail".to_string(), vec!["a@example.com".to_string()]);

        let assertion = sample(Utc::now())
            .with_attribute_statement(AttributeStatement::from_map(&map));

        assert_eq!(assertion.attributes(), map);
    }

    #[test]
    fn missing_conditions_yield_empty_window() {
        let assertion = Assertion::new("_a3", SamlVersion::V2_0, Utc::now());
        assert_eq!(assertion.validity_window(), (None, None));
        assert!(assertion.attributes().is_empty());
    }
}

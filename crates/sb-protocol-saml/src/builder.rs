//! Outbound assertion and response construction.

use chrono::{DateTime, Duration, Utc};
use sb_crypto::generate_saml_id;

use crate::types::{
    Assertion, AttributeMap, AttributeStatement, AuthnContextClass, AuthnStatement, Conditions,
    NameId, Response, SamlVersion, Subject, SubjectConfirmation, SubjectConfirmationData,
};

/// How far `NotBefore` is back-dated to absorb clock skew.
pub const NOT_BEFORE_SKEW_SECONDS: i64 = 5;

/// An identity to assert: the subject plus its attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    /// Subject name identifier value.
    pub subject: String,
    /// Attributes, name to values.
    pub attributes: AttributeMap,
}

impl Identity {
    /// An identity without attributes.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            attributes: AttributeMap::new(),
        }
    }

    /// Adds an attribute value.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.entry(name.into()).or_default().push(value.into());
        self
    }
}

/// Builds assertions and responses issued by one entity.
#[derive(Debug, Clone)]
pub struct SamlBuilder {
    issuer: String,
    version: SamlVersion,
    validity: Duration,
}

impl SamlBuilder {
    /// Creates a builder with the default thirty minute validity.
    #[must_use]
    pub fn new(issuer: impl Into<String>, version: SamlVersion) -> Self {
        Self {
            issuer: issuer.into(),
            version,
            validity: Duration::minutes(sb_core::config::DEFAULT_ASSERTION_VALIDITY_MINUTES),
        }
    }

    /// Sets how long assertions stay valid.
    #[must_use]
    pub const fn with_validity(mut self, validity: Duration) -> Self {
        self.validity = validity;
        self
    }

    /// The issuing entity.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// The protocol version.
    #[must_use]
    pub const fn version(&self) -> SamlVersion {
        self.version
    }

    /// Builds an assertion about `identity` for `audience`, issued at `now`.
    ///
    /// SAML 2.0 carries the subject on the assertion; SAML 1.1 repeats it in
    /// each statement.
    #[must_use]
    pub fn build_assertion(
        &self,
        identity: &Identity,
        audience: &str,
        recipient: &str,
        in_response_to: Option<&str>,
        now: DateTime<Utc>,
    ) -> Assertion {
        let not_on_or_after = now + self.validity;
        let conditions = Conditions::window(
            now - Duration::seconds(NOT_BEFORE_SKEW_SECONDS),
            not_on_or_after,
        )
        .with_audience(audience);

        let confirmation = SubjectConfirmation::bearer(self.version).with_data(SubjectConfirmationData {
            in_response_to: in_response_to.map(str::to_string),
            not_on_or_after: Some(not_on_or_after),
            recipient: Some(recipient.to_string()),
        });
        let subject = Subject::new(NameId::new(identity.subject.as_str())).with_confirmation(confirmation);

        let authn = AuthnStatement::new(now, AuthnContextClass::PasswordProtectedTransport);
        let attributes = (!identity.attributes.is_empty())
            .then(|| AttributeStatement::from_map(&identity.attributes));

        let mut assertion = Assertion::new(generate_saml_id(), self.version, now)
            .with_issuer(self.issuer.as_str())
            .with_conditions(conditions);

        match self.version {
            SamlVersion::V2_0 => {
                assertion = assertion.with_subject(subject).with_authn_statement(authn);
                if let Some(statement) = attributes {
                    assertion = assertion.with_attribute_statement(statement);
                }
            }
            SamlVersion::V1_1 => {
                assertion = assertion.with_authn_statement(authn.with_subject(subject.clone()));
                if let Some(statement) = attributes {
                    assertion = assertion.with_attribute_statement(statement.with_subject(subject));
                }
            }
        }

        assertion
    }

    /// Builds an empty success response addressed to `destination`.
    #[must_use]
    pub fn build_response(
        &self,
        destination: &str,
        in_response_to: Option<&str>,
        now: DateTime<Utc>,
    ) -> Response {
        let mut response = Response::success(generate_saml_id(), self.version, now)
            .with_issuer(self.issuer.as_str())
            .with_destination(destination);
        if let Some(request_id) = in_response_to {
            response = response.in_response_to(request_id);
        }
        response
    }
}

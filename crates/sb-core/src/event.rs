//! Audit events for federated assertion traffic.
//!
//! Every assertion sent or received produces one event carrying the identity
//! provider, the protocol version, the service provider and, for failures, the
//! validation error code. Events never contain key material or assertion
//! contents beyond identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    /// Assertion produced and handed to the transport.
    AssertionSent,
    /// Assertion production failed.
    AssertionSendError,
    /// Assertion received and accepted.
    AssertionReceived,
    /// Assertion received and rejected.
    AssertionReceiveError,
}

impl EventType {
    /// Returns true for the failure variants.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::AssertionSendError | Self::AssertionReceiveError)
    }
}

/// Outcome of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Failure,
}

/// An audit record for one assertion exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,

    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Type of event.
    pub event_type: EventType,

    /// Outcome of the event.
    pub outcome: EventOutcome,

    /// Identity provider entity id.
    pub idp_id: Option<String>,

    /// SAML protocol version.
    pub protocol: Option<String>,

    /// Service provider entity id.
    pub sp_id: Option<String>,

    /// Error code (for failure events), e.g. `REPLAY_ERROR`.
    pub code: Option<String>,

    /// Human-readable error details (for failure events).
    pub error: Option<String>,

    /// Additional details as key-value pairs.
    pub details: Vec<(String, String)>,
}

impl Event {
    /// Creates a new event builder.
    #[must_use]
    pub const fn builder(event_type: EventType) -> EventBuilder {
        EventBuilder::new(event_type)
    }
}

/// Builder for creating events.
#[derive(Debug)]
pub struct EventBuilder {
    event_type: EventType,
    outcome: EventOutcome,
    idp_id: Option<String>,
    protocol: Option<String>,
    sp_id: Option<String>,
    code: Option<String>,
    error: Option<String>,
    details: Vec<(String, String)>,
}

impl EventBuilder {
    /// Creates a new event builder.
    #[must_use]
    pub const fn new(event_type: EventType) -> Self {
        let outcome = if event_type.is_error() {
            EventOutcome::Failure
        } else {
            EventOutcome::Success
        };
        Self {
            event_type,
            outcome,
            idp_id: None,
            protocol: None,
            sp_id: None,
            code: None,
            error: None,
            details: Vec::new(),
        }
    }

    /// Sets the outcome to failure with an error code and message.
    #[must_use]
    pub fn failure(mut self, code: impl Into<String>, error: impl Into<String>) -> Self {
        self.outcome = EventOutcome::Failure;
        self.code = Some(code.into());
        self.error = Some(error.into());
        self
    }

    /// Sets the identity provider.
    #[must_use]
    pub fn idp(mut self, idp_id: impl Into<String>) -> Self {
        self.idp_id = Some(idp_id.into());
        self
    }

    /// Sets the protocol version.
    #[must_use]
    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    /// Sets the service provider.
    #[must_use]
    pub fn sp(mut self, sp_id: impl Into<String>) -> Self {
        self.sp_id = Some(sp_id.into());
        self
    }

    /// Adds a detail key-value pair.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }

    /// Builds the event.
    #[must_use]
    pub fn build(self) -> Event {
        Event {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            outcome: self.outcome,
            idp_id: self.idp_id,
            protocol: self.protocol,
            sp_id: self.sp_id,
            code: self.code,
            error: self.error,
            details: self.details,
        }
    }
}

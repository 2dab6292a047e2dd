//! Audit trail for assertion traffic.
//!
//! Every produced or consumed response yields one audit event. Sinks are
//! fire-and-forget: recording never fails and never blocks validation.

use std::fmt;

use parking_lot::RwLock;
use sb_core::event::{Event, EventType};

use crate::types::SamlVersion;

/// Direction of the audited exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Produced by this side.
    Sent,
    /// Consumed by this side.
    Received,
}

/// Parties of an audited exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditContext {
    /// Direction.
    pub direction: Direction,
    /// Identity provider entity id.
    pub idp: String,
    /// Protocol version.
    pub protocol: SamlVersion,
    /// Service provider entity id, when known.
    pub sp: Option<String>,
}

impl AuditContext {
    /// Context for a response sent by `idp` to `sp`.
    #[must_use]
    pub fn sent(idp: impl Into<String>, protocol: SamlVersion, sp: impl Into<String>) -> Self {
        Self {
            direction: Direction::Sent,
            idp: idp.into(),
            protocol,
            sp: Some(sp.into()),
        }
    }

    /// Context for a response received from `idp`.
    #[must_use]
    pub fn received(idp: impl Into<String>, protocol: SamlVersion) -> Self {
        Self {
            direction: Direction::Received,
            idp: idp.into(),
            protocol,
            sp: None,
        }
    }

    /// Sets the service provider.
    #[must_use]
    pub fn with_sp(mut self, sp: impl Into<String>) -> Self {
        self.sp = Some(sp.into());
        self
    }

    fn event_type(&self, failed: bool) -> EventType {
        match (self.direction, failed) {
            (Direction::Sent, false) => EventType::AssertionSent,
            (Direction::Sent, true) => EventType::AssertionSendError,
            (Direction::Received, false) => EventType::AssertionReceived,
            (Direction::Received, true) => EventType::AssertionReceiveError,
        }
    }

    fn event(&self, failed: bool) -> sb_core::event::EventBuilder {
        let mut builder = Event::builder(self.event_type(failed))
            .idp(self.idp.as_str())
            .protocol(self.protocol.as_str());
        if let Some(sp) = &self.sp {
            builder = builder.sp(sp.as_str());
        }
        builder
    }
}

/// Receives audit events.
pub trait AuditSink: Send + Sync + fmt::Debug {
    /// Records an event.
    fn record(&self, event: Event);

    /// Records a failed exchange.
    fn audit_error(&self, code: &str, context: &AuditContext, details: &str) {
        self.record(context.event(true).failure(code, details).build());
    }

    /// Records a successful exchange.
    fn audit_success(&self, context: &AuditContext, details: &[(&str, &str)]) {
        let builder = details
            .iter()
            .fold(context.event(false), |builder, (key, value)| builder.detail(*key, *value));
        self.record(builder.build());
    }
}

/// Writes audit events as structured `tracing` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Creates the sink.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingAuditSink {
    fn record(&self, event: Event) {
        if event.event_type.is_error() {
            tracing::warn!(
                event_id = %event.id,
                event_type = ?event.event_type,
                idp = ?event.idp_id,
                protocol = ?event.protocol,
                sp = ?event.sp_id,
                code = ?event.code,
                error = ?event.error,
                "saml_audit"
            );
        } else {
            tracing::info!(
                event_id = %event.id,
                event_type = ?event.event_type,
                idp = ?event.idp_id,
                protocol = ?event.protocol,
                sp = ?event.sp_id,
                details = ?event.details,
                "saml_audit"
            );
        }
    }
}

/// Keeps audit events in memory.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    events: RwLock<Vec<Event>>,
}

impl InMemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    /// The most recent event.
    #[must_use]
    pub fn last(&self) -> Option<Event> {
        self.events.read().last().cloned()
    }

    /// Forgets all events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&self, event: Event) {
        self.events.write().push(event);
    }
}

//! Response replay protection.
//!
//! A [`SeenResponseLedger`] records every accepted response identifier with
//! the time it was observed. One ledger is shared by every validation for a
//! consumer configuration, and each check holds its lock for the whole
//! purge, scan and insert.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

use crate::error::{SamlError, SamlResult};
use crate::types::Response;

use super::{ValidationErrorKind, ValidationResult};

#[derive(Debug, Default)]
struct LedgerState {
    entries: BTreeMap<(DateTime<Utc>, u64), String>,
    next_seq: u64,
}

/// Observation time to response identifier, for the replay window.
#[derive(Debug, Default)]
pub struct SeenResponseLedger {
    state: Mutex<LedgerState>,
}

impl SeenResponseLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty ledger ready to share.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of remembered responses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns true if nothing is remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Purges expired entries, then rejects `response_id` if still present,
    /// otherwise records it at `now`.
    pub fn check_and_record(
        &self,
        response_id: &str,
        window: Duration,
        now: DateTime<Utc>,
    ) -> ValidationResult {
        if response_id.trim().is_empty() {
            return ValidationResult::invalid(
                ValidationErrorKind::Unexpected,
                "response has no identifier",
            );
        }
        if window <= Duration::zero() {
            return ValidationResult::invalid(
                ValidationErrorKind::Unexpected,
                format!("replay window must be positive, got {} minutes", window.num_minutes()),
            );
        }
        let Some(cutoff) = now.checked_sub_signed(window) else {
            return ValidationResult::invalid(
                ValidationErrorKind::Unexpected,
                "replay window is out of range",
            );
        };

        let mut state = self.state.lock();

        let kept = state.entries.split_off(&(cutoff, 0));
        let purged = state.entries.len();
        state.entries = kept;
        if purged > 0 {
            tracing::trace!(purged, "purged expired replay entries");
        }

        if state.entries.values().any(|seen| seen == response_id) {
            tracing::warn!(response_id, "replayed response rejected");
            return ValidationResult::invalid(
                ValidationErrorKind::Replay,
                format!(
                    "response '{response_id}' was already received within the {} minute replay window",
                    window.num_minutes()
                ),
            );
        }

        let seq = state.next_seq;
        state.next_seq = state.next_seq.wrapping_add(1);
        state.entries.insert((now, seq), response_id.to_string());
        ValidationResult::Valid
    }
}

/// Replay check bound to a shared ledger and a window.
#[derive(Debug, Clone)]
pub struct ReplayGuard {
    ledger: Arc<SeenResponseLedger>,
    window: Duration,
}

impl ReplayGuard {
    /// Creates a guard.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Config`] if `window_minutes` is not positive.
    pub fn new(ledger: Arc<SeenResponseLedger>, window_minutes: i64) -> SamlResult<Self> {
        let window = Duration::try_minutes(window_minutes)
            .filter(|window| *window > Duration::zero())
            .ok_or_else(|| {
                SamlError::Config(sb_core::Error::Config(format!(
                    "replay window must be a positive number of minutes, got {window_minutes}"
                )))
            })?;
        Ok(Self { ledger, window })
    }

    /// The shared ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Arc<SeenResponseLedger> {
        &self.ledger
    }

    /// The window in minutes.
    #[must_use]
    pub fn window_minutes(&self) -> i64 {
        self.window.num_minutes()
    }

    /// Checks `response` as of the current time.
    pub fn check(&self, response: &Response) -> ValidationResult {
        self.check_at(response, Utc::now())
    }

    /// Checks `response` as of `now`.
    pub fn check_at(&self, response: &Response, now: DateTime<Utc>) -> ValidationResult {
        self.ledger.check_and_record(&response.id, self.window, now)
    }
}

/// Checks `response` against `ledger` with a window of `window_minutes`.
pub fn validate_response(
    response: &Response,
    ledger: &SeenResponseLedger,
    window_minutes: i64,
) -> ValidationResult {
    let Some(window) = Duration::try_minutes(window_minutes) else {
        return ValidationResult::invalid(
            ValidationErrorKind::Unexpected,
            format!("replay window of {window_minutes} minutes is out of range"),
        );
    };
    ledger.check_and_record(&response.id, window, Utc::now())
}

//! Partner metadata.
//!
//! The [`MetadataProvider`] answers the trust questions the policy resolver
//! asks about a named entity. Metadata is loaded once; a provider never
//! fetches or refreshes on a per-message path.

mod entity;
mod provider;

pub use entity::*;
pub use provider::*;

use std::fmt;
use std::sync::Arc;

use sb_crypto::EncryptionKey;

use crate::signature::TrustEngine;
use crate::types::SamlBinding;

/// Answers trust questions about partner entities.
pub trait MetadataProvider: Send + Sync + fmt::Debug {
    /// Returns true if metadata exists for `entity_id`.
    fn has_entity(&self, entity_id: &str) -> bool;

    /// Whether messages issued by `issuer` are signed.
    fn signing_expectation(&self, issuer: &str) -> bool;

    /// Encryption algorithm URI the service provider expects, if any.
    fn encryption_algorithm(&self, sp: &str) -> Option<String>;

    /// Public key assertions for `sp` are encrypted to.
    fn encryption_credential(&self, sp: &str) -> Option<Arc<EncryptionKey>>;

    /// Trust engine holding every entity's verification credentials.
    fn verification_trust_engine(&self) -> Arc<dyn TrustEngine>;

    /// Endpoint URL of `sp` for `binding`.
    fn destination_url(&self, sp: &str, binding: SamlBinding) -> Option<String>;
}

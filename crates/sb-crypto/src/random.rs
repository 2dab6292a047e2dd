//! Identifier generation for assertions and responses.
//!
//! SAML IDs are `xs:ID` values and must not start with a digit, so every
//! generated identifier carries a leading underscore.

use rand::distr::{Alphanumeric, SampleString};
use rand::Rng;

/// Generates `len` random bytes from the thread-local CSPRNG.
#[must_use]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes[..]);
    bytes
}

/// Generates a random alphanumeric string (a-z, A-Z, 0-9).
#[must_use]
pub fn random_alphanumeric(len: usize) -> String {
    let mut rng = rand::rng();
    Alphanumeric.sample_string(&mut rng, len)
}

/// Generates an identifier for an assertion or response.
///
/// 32 alphanumeric characters give roughly 190 bits of entropy, well above
/// the 128 bits SAML core asks of identifiers.
#[must_use]
pub fn generate_saml_id() -> String {
    format!("_{}", random_alphanumeric(32))
}

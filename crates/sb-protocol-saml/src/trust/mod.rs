//! Trust policy resolution.
//!
//! A trust policy is derived, never stored: metadata plus locally configured
//! key material decide whether outbound content is signed and encrypted and
//! whether inbound content must carry a trusted signature or be decrypted.

mod policy;
mod resolver;

pub use policy::*;
pub use resolver::*;

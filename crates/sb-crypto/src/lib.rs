//! # sb-crypto
//!
//! Cryptographic primitives for saml-bridge using aws-lc-rs.
//!
//! The SAML layer treats everything here as opaque library calls:
//!
//! - [`rsa`] - RSA PKCS#1 v1.5 signing and verification for XML-DSig
//! - [`encryption`] - Session-key assertion encryption (AES-GCM + RSA-OAEP)
//! - [`keystore`] - Resolving keystore references to loaded keys
//! - [`hash`] - Digest functions used for XML-DSig references
//! - [`random`] - Identifier generation for assertions and responses
//!
//! Private key bytes never appear in error messages or logs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod encryption;
pub mod error;
pub mod hash;
pub mod keystore;
pub mod pem;
pub mod random;
pub mod rsa;

pub use encryption::{
    open, seal, DataEncryptionAlgorithm, DecryptionKey, EncryptionKey, SealedPayload,
};
pub use error::CryptoError;
pub use hash::{sha256, sha384, sha512};
pub use keystore::{InMemoryKeyStore, KeyStore};
pub use random::generate_saml_id;
pub use rsa::{rsa_verify, RsaSignatureAlgorithm, SigningKey};

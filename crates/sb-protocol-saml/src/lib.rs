//! SAML 1.1 and 2.0 trust decisions and response validation.
//!
//! The crate sits between an identity provider and its service providers
//! (or the reverse) and answers two questions per partner: how must
//! outbound responses be protected, and is an inbound response acceptable.
//!
//! - [`trust`] - Outbound and inbound trust policies derived from metadata and key material
//! - [`metadata`] - Partner metadata and the provider abstraction
//! - [`signature`] - Enveloped XML-DSig signing and trust-engine verification
//! - [`encryption`] - Assertion encryption and decryption
//! - [`validation`] - Assertion checks and the replay ledger
//! - [`facade`] - Producer and consumer pipelines
//! - [`overrides`] - Per-partner validator, audit and metadata strategies
//! - [`audit`] - Audit events for every exchange
//! - [`translation`] - Internal partner codes to entity identifiers
//!
//! # Example
//!
//! ```rust,ignore
//! use sb_protocol_saml::facade::{ConsumerFacade, Partners};
//!
//! let consumer = ConsumerFacade::from_config(&config, key_store, partners, ledger, ["idp"])?;
//! let principal = consumer.consume("idp", &payload, Some(&request_id))?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
pub mod builder;
pub mod encryption;
pub mod error;
pub mod facade;
pub mod metadata;
pub mod overrides;
pub mod signature;
pub mod translation;
pub mod trust;
pub mod types;
pub mod validation;
pub mod wire;

pub use error::{SamlError, SamlResult};
pub use facade::{AuthenticatedPrincipal, ConsumerFacade, Partners, ProducerFacade};
pub use types::*;
pub use validation::{ValidationErrorKind, ValidationFailure, ValidationResult};

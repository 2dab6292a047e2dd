//! # sb-core
//!
//! Core configuration, error handling and audit event types for saml-bridge.
//!
//! This crate provides foundational types shared by the SAML protocol crate,
//! the crypto crate and the operator CLI.
//!
//! ## Modules
//!
//! - [`config`] - Producer/consumer configuration, replay window, key material
//! - [`error`] - Configuration-time error type
//! - [`event`] - Audit events for assertion send/receive outcomes

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod event;

pub use config::{Config, KeyMaterial};
pub use error::{Error, Result};

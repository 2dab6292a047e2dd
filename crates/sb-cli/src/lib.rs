//! # sb-cli
//!
//! Operator tooling for saml-bridge:
//! - trust policy inspection per partner
//! - partner code translation
//! - offline validation of captured POST payloads

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod keystore;
pub mod output;

pub use cli::Cli;
pub use config::CliConfig;
pub use error::{CliError, CliResult};

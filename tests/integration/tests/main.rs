//! End-to-end tests.
//!
//! An identity provider and a service provider are wired together in
//! process, each with its own metadata view and key store.

mod common;
mod overrides;
mod replay;
mod roundtrip;
mod scenarios;

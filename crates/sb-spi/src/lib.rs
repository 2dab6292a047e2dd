//! # sb-spi
//!
//! Extension points for per-partner overrides.
//!
//! Some partners need behaviour that differs from the stock implementation:
//! a stricter validator, a different audit destination, metadata sourced from
//! somewhere else. Rather than discovering those implementations at runtime,
//! they are registered up front in a [`StrategyRegistry`] keyed by partner
//! code, alongside a named default entry.
//!
//! - [`Spi`] - Names an extension point
//! - [`StrategyRegistry`] - Partner code to implementation mapping

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod provider;
pub mod registry;

pub use provider::{Spi, SpiError};
pub use registry::{StrategyRegistry, DEFAULT_STRATEGY};

//! Extension point definitions.

use thiserror::Error;

/// Error type for strategy registry operations.
#[derive(Debug, Error)]
pub enum SpiError {
    /// No strategy registered for the code, and no default either.
    #[error("no {spi} strategy for partner '{code}' and no default registered")]
    StrategyNotFound {
        /// Extension point name.
        spi: &'static str,
        /// Partner code that was looked up.
        code: String,
    },

    /// A required strategy is missing.
    #[error("required {spi} strategy missing: {code}")]
    MissingRequired {
        /// Extension point name.
        spi: &'static str,
        /// Partner code that is required.
        code: String,
    },
}

/// Definition of an extension point.
///
/// An extension point is a category of overridable behaviour, such as
/// "validator" or "audit".
pub trait Spi: Send + Sync {
    /// Returns the unique name of this extension point.
    fn name(&self) -> &'static str;
}

//! Strategy registry keyed by partner code.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::provider::{Spi, SpiError};

/// Code under which the stock implementation is registered.
pub const DEFAULT_STRATEGY: &str = "default";

/// Registry of strategy implementations for one extension point.
///
/// Lookups by partner code fall back to the default entry, so a partner
/// without an override gets the stock behaviour.
pub struct StrategyRegistry<T: ?Sized> {
    spi: &'static str,
    strategies: DashMap<String, Arc<T>>,
    default_code: RwLock<String>,
}

impl<T: ?Sized> fmt::Debug for StrategyRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("spi", &self.spi)
            .field("codes", &self.list())
            .field("default", &*self.default_code.read())
            .finish()
    }
}

impl<T: ?Sized> StrategyRegistry<T> {
    /// Creates an empty registry for the given extension point.
    #[must_use]
    pub fn new(spi: &dyn Spi) -> Self {
        Self::named(spi.name())
    }

    /// Creates an empty registry with an explicit extension point name.
    #[must_use]
    pub fn named(spi: &'static str) -> Self {
        Self {
            spi,
            strategies: DashMap::new(),
            default_code: RwLock::new(DEFAULT_STRATEGY.to_string()),
        }
    }

    /// Creates a registry with `strategy` as its default entry.
    #[must_use]
    pub fn with_default(spi: &'static str, strategy: Arc<T>) -> Self {
        let registry = Self::named(spi);
        registry.register(DEFAULT_STRATEGY, strategy);
        registry
    }

    /// Returns the extension point name.
    #[must_use]
    pub const fn spi_name(&self) -> &'static str {
        self.spi
    }

    /// Registers a strategy for a partner code, returning any replaced entry.
    pub fn register(&self, code: impl Into<String>, strategy: Arc<T>) -> Option<Arc<T>> {
        let code = code.into();
        tracing::debug!(spi = self.spi, code = %code, "registering strategy");
        self.strategies.insert(code, strategy)
    }

    /// Points the default entry at another registered code.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is registered under `code`.
    pub fn set_default(&self, code: &str) -> Result<(), SpiError> {
        if !self.has_strategy(code) {
            return Err(SpiError::StrategyNotFound {
                spi: self.spi,
                code: code.to_string(),
            });
        }
        *self.default_code.write() = code.to_string();
        Ok(())
    }

    /// Returns the code currently used as the default.
    #[must_use]
    pub fn default_code(&self) -> String {
        self.default_code.read().clone()
    }

    /// Returns the strategy registered for exactly `code`.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<Arc<T>> {
        self.strategies.get(code).map(|entry| Arc::clone(entry.value()))
    }

    /// Resolves the strategy for a partner, falling back to the default.
    ///
    /// # Errors
    ///
    /// Returns an error if neither the partner nor the default is registered.
    pub fn resolve(&self, code: &str) -> Result<Arc<T>, SpiError> {
        if let Some(strategy) = self.get(code) {
            return Ok(strategy);
        }
        let default_code = self.default_code();
        tracing::trace!(spi = self.spi, code, default = %default_code, "using default strategy");
        self.get(&default_code)
            .ok_or_else(|| SpiError::StrategyNotFound {
                spi: self.spi,
                code: code.to_string(),
            })
    }

    /// Checks whether a strategy is registered for exactly `code`.
    #[must_use]
    pub fn has_strategy(&self, code: &str) -> bool {
        self.strategies.contains_key(code)
    }

    /// Lists registered codes in sorted order.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.strategies.iter().map(|e| e.key().clone()).collect();
        codes.sort();
        codes
    }

    /// Returns the number of registered strategies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Validates that every listed code has a registered strategy.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing code.
    pub fn validate_required(&self, codes: &[&str]) -> Result<(), SpiError> {
        for code in codes {
            if !self.has_strategy(code) {
                return Err(SpiError::MissingRequired {
                    spi: self.spi,
                    code: (*code).to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct Fixed(&'static str);

    impl Greeter for Fixed {
        fn greet(&self) -> String {
            self.0.to_string()
        }
    }

    struct GreeterSpi;

    impl Spi for GreeterSpi {
        fn name(&self) -> &'static str {
            "greeter"
        }
    }

    #[test]
    fn registry_starts_empty() {
        let registry: StrategyRegistry<dyn Greeter> = StrategyRegistry::new(&GreeterSpi);
        assert!(registry.is_empty());
        assert_eq!(registry.spi_name(), "greeter");
        assert!(registry.resolve("acme").is_err());
    }

    #[test]
    fn resolve_falls_back_to_default() {
        let registry: StrategyRegistry<dyn Greeter> =
            StrategyRegistry::with_default("greeter", Arc::new(Fixed("stock")));
        registry.register("acme", Arc::new(Fixed("acme")));

        assert_eq!(registry.resolve("acme").unwrap().greet(), "acme");
        assert_eq!(registry.resolve("globex").unwrap().greet(), "stock");
    }

    #[test]
    fn set_default_requires_registration() {
        let registry: StrategyRegistry<dyn Greeter> = StrategyRegistry::named("greeter");
        assert!(registry.set_default("acme").is_err());

        registry.register("acme", Arc::new(Fixed("acme")));
        registry.set_default("acme").unwrap();
        assert_eq!(registry.default_code(), "acme");
        assert_eq!(registry.resolve("other").unwrap().greet(), "acme");
    }

    #[test]
    fn register_replaces_and_lists_sorted() {
        let registry: StrategyRegistry<dyn Greeter> = StrategyRegistry::named("greeter");
        assert!(registry.register("zeta", Arc::new(Fixed("z1"))).is_none());
        assert!(registry.register("alpha", Arc::new(Fixed("a"))).is_none());
        assert!(registry.register("zeta", Arc::new(Fixed("z2"))).is_some());

        assert_eq!(registry.list(), vec!["alpha".to_string(), "zeta".to_string()]);
        assert_eq!(registry.get("zeta").unwrap().greet(), "z2");
    }

    #[test]
    fn validate_required_fails_for_missing() {
        let registry: StrategyRegistry<dyn Greeter> =
            StrategyRegistry::with_default("greeter", Arc::new(Fixed("stock")));
        assert!(registry.validate_required(&[DEFAULT_STRATEGY]).is_ok());
        assert!(registry.validate_required(&["acme"]).is_err());
    }
}

//! Partner code to entity identifier translation.
//!
//! Internal partner codes and SAML entity identifiers are dual-keyed. A
//! customer deployment may override any base mapping. Lookups never fail:
//! an unmapped value translates to itself.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{SamlError, SamlResult};

/// Serialized translation table: partner code to entity identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationTable {
    /// Mappings shipped with the product.
    #[serde(default)]
    pub base: BTreeMap<String, String>,

    /// Customer-specific mappings; these win over `base`.
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

/// Bidirectional lookup built from a [`TranslationTable`].
#[derive(Debug, Clone, Default)]
pub struct EntityTranslator {
    to_entity: HashMap<String, String>,
    to_code: HashMap<String, String>,
}

impl EntityTranslator {
    /// A translator with no mappings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the lookup, applying overrides on top of the base mappings.
    #[must_use]
    pub fn from_table(table: &TranslationTable) -> Self {
        let mut translator = Self::new();
        for (code, entity) in table.base.iter().chain(&table.overrides) {
            translator.insert(code, entity);
        }
        translator
    }

    /// Parses a JSON table.
    ///
    /// # Errors
    ///
    /// Returns [`SamlError::Metadata`] if the JSON is malformed.
    pub fn from_json(json: &str) -> SamlResult<Self> {
        let table: TranslationTable = serde_json::from_str(json)
            .map_err(|e| SamlError::Metadata(format!("invalid translation table: {e}")))?;
        Ok(Self::from_table(&table))
    }

    /// Adds or replaces a mapping.
    #[must_use]
    pub fn with_mapping(mut self, code: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.insert(&code.into(), &entity_id.into());
        self
    }

    fn insert(&mut self, code: &str, entity_id: &str) {
        if let Some(previous) = self.to_entity.insert(code.to_string(), entity_id.to_string()) {
            if self.to_code.get(&previous).is_some_and(|c| c == code) {
                self.to_code.remove(&previous);
            }
        }
        self.to_code.insert(entity_id.to_string(), code.to_string());
    }

    /// Entity identifier for a partner code, or the code itself.
    #[must_use]
    pub fn lookup_entity_identifier<'a>(&'a self, code: &'a str) -> &'a str {
        self.to_entity.get(code).map_or(code, String::as_str)
    }

    /// Partner code for an entity identifier, or the identifier itself.
    #[must_use]
    pub fn lookup_internal_code<'a>(&'a self, entity_id: &'a str) -> &'a str {
        self.to_code.get(entity_id).map_or(entity_id, String::as_str)
    }

    /// Number of mapped partner codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_entity.len()
    }

    /// Returns true if nothing is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_entity.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmapped_values_translate_to_themselves() {
        let translator = EntityTranslator::new();
        assert_eq!(translator.lookup_entity_identifier("x"), "x");
        assert_eq!(translator.lookup_internal_code("x"), "x");
    }

    #[test]
    fn mapped_values_round_trip() {
        let translator = EntityTranslator::new().with_mapping("ACME", "https://idp.acme.example");

        let entity = translator.lookup_entity_identifier("ACME");
        assert_eq!(entity, "https://idp.acme.example");
        assert_eq!(translator.lookup_internal_code(entity), "ACME");
    }

    #[test]
    fn overrides_replace_base_mappings() {
        let translator = EntityTranslator::from_json(
            r#"{
                "base": { "ACME": "https://old.acme.example", "GLOBEX": "https://globex.example" },
                "overrides": { "ACME": "https://new.acme.example" }
            }"#,
        )
        .unwrap();

        assert_eq!(translator.len(), 2);
        assert_eq!(translator.lookup_entity_identifier("ACME"), "https://new.acme.example");
        assert_eq!(translator.lookup_internal_code("https://new.acme.example"), "ACME");
        assert_eq!(
            translator.lookup_internal_code("https://old.acme.example"),
            "https://old.acme.example"
        );
    }

    #[test]
    fn malformed_table_is_rejected() {
        assert!(EntityTranslator::from_json("[]").is_err());
    }
}

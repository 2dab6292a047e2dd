//! Key store descriptions loaded from disk.
//!
//! ```json
//! {
//!   "stores": {
//!     "idp-keys": {
//!       "password": "changeit",
//!       "keys": {
//!         "signing": { "password": "keypass", "usage": "signing", "pem_file": "signing.pem" }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! `pem_file` paths are relative to the description file.

use std::collections::BTreeMap;
use std::path::Path;

use sb_crypto::{DecryptionKey, InMemoryKeyStore, SigningKey};
use serde::Deserialize;

use crate::{CliError, CliResult};

/// Whole key store description.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyStoreFile {
    /// Stores by name.
    #[serde(default)]
    pub stores: BTreeMap<String, StoreEntry>,
}

/// One password-protected store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreEntry {
    /// Store password.
    pub password: String,
    /// Keys by alias.
    #[serde(default)]
    pub keys: BTreeMap<String, KeyEntry>,
}

/// One private key.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyEntry {
    /// Key password.
    pub password: String,
    /// What the key is for.
    pub usage: KeyUsage,
    /// PEM file holding the private key.
    pub pem_file: String,
}

/// Key usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyUsage {
    /// Signs outbound responses.
    Signing,
    /// Decrypts inbound assertions.
    Decryption,
}

impl KeyStoreFile {
    /// Parses a description.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> CliResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads every key into an in-memory store, reading PEM files relative
    /// to `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if a PEM file cannot be read or parsed.
    pub fn load(&self, base_dir: &Path) -> CliResult<InMemoryKeyStore> {
        let key_store = InMemoryKeyStore::new();
        for (store_name, store) in &self.stores {
            key_store.create_store(store_name.as_str(), store.password.as_str());
            for (alias, key) in &store.keys {
                let path = base_dir.join(&key.pem_file);
                let pem = std::fs::read_to_string(&path).map_err(|e| {
                    CliError::KeyStore(format!("{store_name}/{alias}: {}: {e}", path.display()))
                })?;
                match key.usage {
                    KeyUsage::Signing => key_store.insert_signing_key(
                        store_name,
                        alias.as_str(),
                        key.password.as_str(),
                        SigningKey::from_pem(&pem)?,
                    )?,
                    KeyUsage::Decryption => key_store.insert_decryption_key(
                        store_name,
                        alias.as_str(),
                        key.password.as_str(),
                        DecryptionKey::from_pem(&pem)?,
                    )?,
                }
                tracing::debug!(store = %store_name, alias = %alias, usage = ?key.usage, "loaded key");
            }
        }
        Ok(key_store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_description() {
        let file = KeyStoreFile::from_json(
            r#"{"stores":{"idp-keys":{"password":"changeit","keys":{
                "signing":{"password":"keypass","usage":"signing","pem_file":"signing.pem"}}}}}"#,
        )
        .unwrap();
        let store = &file.stores["idp-keys"];
        assert_eq!(store.password, "changeit");
        assert_eq!(store.keys["signing"].usage, KeyUsage::Signing);
    }

    #[test]
    fn unknown_usage_is_rejected() {
        assert!(KeyStoreFile::from_json(
            r#"{"stores":{"s":{"password":"p","keys":{"k":{"password":"p","usage":"wrapping","pem_file":"k.pem"}}}}}"#,
        )
        .is_err());
    }

    #[test]
    fn missing_pem_file_names_the_key() {
        let file = KeyStoreFile::from_json(
            r#"{"stores":{"s":{"password":"p","keys":{"k":{"password":"p","usage":"decryption","pem_file":"missing.pem"}}}}}"#,
        )
        .unwrap();
        let err = file.load(Path::new("/nonexistent")).unwrap_err();
        assert!(err.to_string().contains("s/k"));
    }

    #[test]
    fn empty_description_gives_empty_store() {
        let file = KeyStoreFile::default();
        assert!(file.load(Path::new(".")).is_ok());
    }
}

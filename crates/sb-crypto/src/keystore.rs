//! Resolving keystore references to loaded keys.
//!
//! Deployment configuration never carries key bytes directly. It names a
//! store, the store password, an alias inside the store and the key password
//! (see [`KeyMaterial`]). A [`KeyStore`] turns that reference into a usable
//! key, or refuses.

use std::collections::HashMap;
use std::sync::Arc;

use aws_lc_rs::constant_time::verify_slices_are_equal;
use parking_lot::RwLock;
use sb_core::KeyMaterial;

use crate::encryption::DecryptionKey;
use crate::error::CryptoError;
use crate::rsa::SigningKey;

/// Resolves keystore references into keys.
pub trait KeyStore: Send + Sync {
    /// Loads the signing key named by `material`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyStore`] if the reference is incomplete, a
    /// password is wrong or the alias does not hold a signing key.
    fn signing_key(&self, material: &KeyMaterial) -> Result<Arc<SigningKey>, CryptoError>;

    /// Loads the decryption key named by `material`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`KeyStore::signing_key`].
    fn decryption_key(&self, material: &KeyMaterial) -> Result<Arc<DecryptionKey>, CryptoError>;
}

#[derive(Clone)]
enum StoredKey {
    Signing(Arc<SigningKey>),
    Decryption(Arc<DecryptionKey>),
}

struct Entry {
    password: String,
    key: StoredKey,
}

struct Store {
    password: String,
    entries: HashMap<String, Entry>,
}

/// Key store held in process memory.
///
/// Used by tests and by the CLI, which loads PEM files into it at startup.
#[derive(Default)]
pub struct InMemoryKeyStore {
    stores: RwLock<HashMap<String, Store>>,
}

impl std::fmt::Debug for InMemoryKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stores = self.stores.read();
        let mut names: Vec<&String> = stores.keys().collect();
        names.sort();
        f.debug_struct("InMemoryKeyStore")
            .field("stores", &names)
            .finish()
    }
}

impl InMemoryKeyStore {
    /// Creates an empty key store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates (or replaces the password of) a named store.
    pub fn create_store(&self, store: impl Into<String>, password: impl Into<String>) {
        let mut stores = self.stores.write();
        let password = password.into();
        stores
            .entry(store.into())
            .and_modify(|s| s.password.clone_from(&password))
            .or_insert_with(|| Store {
                password,
                entries: HashMap::new(),
            });
    }

    /// Adds a signing key under `alias`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store does not exist.
    pub fn insert_signing_key(
        &self,
        store: &str,
        alias: impl Into<String>,
        key_password: impl Into<String>,
        key: SigningKey,
    ) -> Result<(), CryptoError> {
        self.insert(store, alias.into(), key_password.into(), StoredKey::Signing(Arc::new(key)))
    }

    /// Adds a decryption key under `alias`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store does not exist.
    pub fn insert_decryption_key(
        &self,
        store: &str,
        alias: impl Into<String>,
        key_password: impl Into<String>,
        key: DecryptionKey,
    ) -> Result<(), CryptoError> {
        self.insert(
            store,
            alias.into(),
            key_password.into(),
            StoredKey::Decryption(Arc::new(key)),
        )
    }

    fn insert(
        &self,
        store: &str,
        alias: String,
        password: String,
        key: StoredKey,
    ) -> Result<(), CryptoError> {
        let mut stores = self.stores.write();
        let target = stores
            .get_mut(store)
            .ok_or_else(|| CryptoError::KeyStore(format!("unknown store: {store}")))?;
        target.entries.insert(alias, Entry { password, key });
        Ok(())
    }

    fn lookup(&self, material: &KeyMaterial) -> Result<StoredKey, CryptoError> {
        let (Some(store), Some(store_password), Some(alias), Some(key_password)) = (
            material.store.as_deref(),
            material.store_password.as_deref(),
            material.alias.as_deref(),
            material.key_password.as_deref(),
        ) else {
            return Err(CryptoError::KeyStore(format!(
                "incomplete key reference, missing: {}",
                material.missing_fields().join(", ")
            )));
        };

        let stores = self.stores.read();
        let target = stores
            .get(store)
            .ok_or_else(|| CryptoError::KeyStore(format!("unknown store: {store}")))?;

        if !passwords_match(&target.password, store_password) {
            tracing::warn!(store, "key store password rejected");
            return Err(CryptoError::KeyStore(format!("store password rejected: {store}")));
        }

        let entry = target
            .entries
            .get(alias)
            .ok_or_else(|| CryptoError::KeyStore(format!("alias not found: {alias}")))?;

        if !passwords_match(&entry.password, key_password) {
            tracing::warn!(store, alias, "key password rejected");
            return Err(CryptoError::KeyStore(format!("key password rejected: {alias}")));
        }

        Ok(entry.key.clone())
    }
}

impl KeyStore for InMemoryKeyStore {
    fn signing_key(&self, material: &KeyMaterial) -> Result<Arc<SigningKey>, CryptoError> {
        match self.lookup(material)? {
            StoredKey::Signing(key) => Ok(key),
            StoredKey::Decryption(_) => Err(CryptoError::KeyStore(
                "alias does not hold a signing key".to_string(),
            )),
        }
    }

    fn decryption_key(&self, material: &KeyMaterial) -> Result<Arc<DecryptionKey>, CryptoError> {
        match self.lookup(material)? {
            StoredKey::Decryption(key) => Ok(key),
            StoredKey::Signing(_) => Err(CryptoError::KeyStore(
                "alias does not hold a decryption key".to_string(),
            )),
        }
    }
}

fn passwords_match(expected: &str, given: &str) -> bool {
    verify_slices_are_equal(expected.as_bytes(), given.as_bytes()).is_ok()
}

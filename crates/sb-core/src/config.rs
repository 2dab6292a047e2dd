//! Configuration management for saml-bridge.
//!
//! Configuration is loaded from environment variables (optionally seeded from
//! a `.env` file) with sensible defaults. Key material follows the keystore
//! convention of the deployments this system replaces: a store name, a store
//! password, a key alias and a key password.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default replay window in minutes.
pub const DEFAULT_REPLAY_WINDOW_MINUTES: i64 = 30;

/// Default assertion validity in minutes.
pub const DEFAULT_ASSERTION_VALIDITY_MINUTES: i64 = 30;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Replay guard configuration.
    #[serde(default)]
    pub replay: ReplayConfig,
    /// Outbound (identity provider side) configuration.
    #[serde(default)]
    pub producer: ProducerConfig,
    /// Inbound (service provider side) configuration.
    #[serde(default)]
    pub consumer: ConsumerConfig,
}

/// Replay guard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Sliding window during which a response id must not reappear.
    pub window_minutes: i64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            window_minutes: DEFAULT_REPLAY_WINDOW_MINUTES,
        }
    }
}

/// Producer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProducerConfig {
    /// Entity id used as issuer on outbound assertions.
    pub issuer: Option<String>,
    /// SAML protocol version ("1.1" or "2.0").
    pub protocol: String,
    /// Default assertion validity in minutes.
    pub assertion_validity_minutes: i64,
    /// Signing key material.
    #[serde(default)]
    pub signing_key: KeyMaterial,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            issuer: None,
            protocol: "2.0".to_string(),
            assertion_validity_minutes: DEFAULT_ASSERTION_VALIDITY_MINUTES,
            signing_key: KeyMaterial::default(),
        }
    }
}

/// Consumer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumerConfig {
    /// SAML protocol version expected on inbound assertions.
    pub protocol: String,
    /// Decryption key material.
    #[serde(default)]
    pub decryption_key: KeyMaterial,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            protocol: "2.0".to_string(),
            decryption_key: KeyMaterial::default(),
        }
    }
}

/// Key material reference.
///
/// Signing and encryption are only enabled when all four fields are present.
/// Any missing field means "not configured".
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyMaterial {
    /// Key store name.
    pub store: Option<String>,
    /// Key store password.
    pub store_password: Option<String>,
    /// Alias of the key inside the store.
    pub alias: Option<String>,
    /// Password protecting the key entry.
    pub key_password: Option<String>,
}

impl KeyMaterial {
    /// Creates complete key material.
    #[must_use]
    pub fn new(
        store: impl Into<String>,
        store_password: impl Into<String>,
        alias: impl Into<String>,
        key_password: impl Into<String>,
    ) -> Self {
        Self {
            store: Some(store.into()),
            store_password: Some(store_password.into()),
            alias: Some(alias.into()),
            key_password: Some(key_password.into()),
        }
    }

    /// Returns true when every field is present.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.store.is_some()
            && self.store_password.is_some()
            && self.alias.is_some()
            && self.key_password.is_some()
    }

    /// Returns true when no field is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.store.is_none()
            && self.store_password.is_none()
            && self.alias.is_none()
            && self.key_password.is_none()
    }

    /// Returns true when some, but not all, fields are present.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        !self.is_complete() && !self.is_empty()
    }

    /// Names of the fields that are missing.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.store.is_none() {
            missing.push("store");
        }
        if self.store_password.is_none() {
            missing.push("store_password");
        }
        if self.alias.is_none() {
            missing.push("alias");
        }
        if self.key_password.is_none() {
            missing.push("key_password");
        }
        missing
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("store", &self.store)
            .field("store_password", &self.store_password.as_ref().map(|_| "<redacted>"))
            .field("alias", &self.alias)
            .field("key_password", &self.key_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric setting cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric setting cannot be parsed or is not positive.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let window_minutes = parse_minutes(
            &lookup,
            "SB_REPLAY_WINDOW_MINUTES",
            DEFAULT_REPLAY_WINDOW_MINUTES,
        )?;
        let assertion_validity_minutes = parse_minutes(
            &lookup,
            "SB_ASSERTION_VALIDITY_MINUTES",
            DEFAULT_ASSERTION_VALIDITY_MINUTES,
        )?;

        let producer = ProducerConfig {
            issuer: lookup("SB_ISSUER"),
            protocol: lookup("SB_PRODUCER_PROTOCOL").unwrap_or_else(|| "2.0".to_string()),
            assertion_validity_minutes,
            signing_key: key_material(&lookup, "SB_SIGNING"),
        };

        let consumer = ConsumerConfig {
            protocol: lookup("SB_CONSUMER_PROTOCOL").unwrap_or_else(|| "2.0".to_string()),
            decryption_key: key_material(&lookup, "SB_DECRYPTION"),
        };

        let config = Self {
            replay: ReplayConfig { window_minutes },
            producer,
            consumer,
        };

        tracing::debug!(
            replay_window_minutes = config.replay.window_minutes,
            producer_protocol = %config.producer.protocol,
            consumer_protocol = %config.consumer.protocol,
            signing_key_complete = config.producer.signing_key.is_complete(),
            decryption_key_complete = config.consumer.decryption_key.is_complete(),
            "configuration loaded"
        );

        Ok(config)
    }
}

/// Reads the four keystore settings sharing `prefix`.
fn key_material<F>(lookup: &F, prefix: &str) -> KeyMaterial
where
    F: Fn(&str) -> Option<String>,
{
    let read = |suffix: &str| lookup(&format!("{prefix}_{suffix}")).filter(|v| !v.is_empty());
    KeyMaterial {
        store: read("KEYSTORE"),
        store_password: read("KEYSTORE_PASSWORD"),
        alias: read("KEY_ALIAS"),
        key_password: read("KEY_PASSWORD"),
    }
}

fn parse_minutes<F>(lookup: &F, key: &str, default: i64) -> Result<i64>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let minutes: i64 = raw
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be a whole number of minutes")))?;
    if minutes <= 0 {
        return Err(Error::Config(format!("{key} must be positive")));
    }
    Ok(minutes)
}

//! Session-key assertion encryption.
//!
//! An assertion is encrypted with a fresh AES-GCM content key; that key is
//! then wrapped with the recipient's RSA public key using OAEP (SHA-256,
//! MGF1-SHA-256). This is the XML-Enc 1.1 `aes*-gcm` + `rsa-oaep` pairing
//! that SAML service providers advertise in their metadata.

use aws_lc_rs::{
    aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_128_GCM, AES_256_GCM, NONCE_LEN},
    rand::{SecureRandom, SystemRandom},
    rsa::{
        KeySize, OaepPrivateDecryptingKey, OaepPublicEncryptingKey, PrivateDecryptingKey,
        PublicEncryptingKey, OAEP_SHA256_MGF1SHA256,
    },
};

use crate::error::CryptoError;
use crate::pem::pem_to_der;

/// XML-Enc key transport URI for RSA-OAEP.
pub const KEY_TRANSPORT_RSA_OAEP: &str = "http://www.w3.org/2009/xmlenc11#rsa-oaep";

/// Content encryption algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataEncryptionAlgorithm {
    /// AES-128 in GCM mode.
    Aes128Gcm,
    /// AES-256 in GCM mode.
    #[default]
    Aes256Gcm,
}

impl DataEncryptionAlgorithm {
    /// Returns the XML-Enc URI.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::Aes128Gcm => "http://www.w3.org/2009/xmlenc11#aes128-gcm",
            Self::Aes256Gcm => "http://www.w3.org/2009/xmlenc11#aes256-gcm",
        }
    }

    /// Parses an algorithm from its XML-Enc URI.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            "http://www.w3.org/2009/xmlenc11#aes128-gcm" => Some(Self::Aes128Gcm),
            "http://www.w3.org/2009/xmlenc11#aes256-gcm" => Some(Self::Aes256Gcm),
            _ => None,
        }
    }

    /// Content key length in bytes.
    #[must_use]
    pub const fn key_len(self) -> usize {
        match self {
            Self::Aes128Gcm => 16,
            Self::Aes256Gcm => 32,
        }
    }

    fn content_key(self, key_bytes: &[u8]) -> Result<LessSafeKey, CryptoError> {
        let alg = match self {
            Self::Aes128Gcm => &AES_128_GCM,
            Self::Aes256Gcm => &AES_256_GCM,
        };
        let unbound = UnboundKey::new(alg, key_bytes).map_err(|_| CryptoError::Decryption)?;
        Ok(LessSafeKey::new(unbound))
    }
}

/// Recipient public key used to wrap content keys.
pub struct EncryptionKey {
    key: OaepPublicEncryptingKey,
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("ciphertext_size", &self.key.ciphertext_size())
            .finish()
    }
}

impl EncryptionKey {
    /// Creates an encryption key from an X.509 `SubjectPublicKeyInfo` DER.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not an RSA public key.
    pub fn from_der(spki_der: &[u8]) -> Result<Self, CryptoError> {
        let public = PublicEncryptingKey::from_der(spki_der)
            .map_err(|e| CryptoError::InvalidKey(format!("invalid RSA public key: {e}")))?;
        Self::from_public_key(public)
    }

    /// Creates an encryption key from a PEM `PUBLIC KEY` block.
    ///
    /// # Errors
    ///
    /// Returns an error if the PEM block is missing or the key is invalid.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let der = pem_to_der(pem, "PUBLIC KEY")
            .ok_or_else(|| CryptoError::InvalidKey("no public key PEM block".to_string()))?;
        Self::from_der(&der)
    }

    /// Wraps an already parsed public key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be used for OAEP.
    pub fn from_public_key(public: PublicEncryptingKey) -> Result<Self, CryptoError> {
        let key = OaepPublicEncryptingKey::new(public)
            .map_err(|e| CryptoError::InvalidKey(format!("RSA key unusable for OAEP: {e}")))?;
        Ok(Self { key })
    }

    fn wrap(&self, content_key: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut out = vec![0u8; self.key.ciphertext_size()];
        let wrapped = self
            .key
            .encrypt(&OAEP_SHA256_MGF1SHA256, content_key, &mut out, None)
            .map_err(|e| CryptoError::Encryption(format!("key wrap failed: {e}")))?;
        Ok(wrapped.to_vec())
    }
}

/// Recipient private key used to unwrap content keys.
pub struct DecryptionKey {
    key: OaepPrivateDecryptingKey,
}

impl std::fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptionKey").finish_non_exhaustive()
    }
}

impl DecryptionKey {
    /// Creates a decryption key from a PKCS#8 DER-encoded private key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be parsed.
    pub fn from_pkcs8(pkcs8_der: &[u8]) -> Result<Self, CryptoError> {
        let private = PrivateDecryptingKey::from_pkcs8(pkcs8_der)
            .map_err(|e| CryptoError::InvalidKey(format!("invalid RSA PKCS#8 key: {e}")))?;
        Self::from_private_key(private)
    }

    /// Creates a decryption key from a PEM `PRIVATE KEY` block.
    ///
    /// # Errors
    ///
    /// Returns an error if the PEM block is missing or the key is invalid.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let der = pem_to_der(pem, "PRIVATE KEY")
            .ok_or_else(|| CryptoError::InvalidKey("no private key PEM block".to_string()))?;
        Self::from_pkcs8(&der)
    }

    /// Wraps an already parsed private key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be used for OAEP.
    pub fn from_private_key(private: PrivateDecryptingKey) -> Result<Self, CryptoError> {
        let key = OaepPrivateDecryptingKey::new(private)
            .map_err(|e| CryptoError::InvalidKey(format!("RSA key unusable for OAEP: {e}")))?;
        Ok(Self { key })
    }

    /// Generates a fresh key pair, returning the private half and its public key.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails.
    pub fn generate(size: KeySize) -> Result<(Self, EncryptionKey), CryptoError> {
        let private = PrivateDecryptingKey::generate(size)
            .map_err(|e| CryptoError::KeyGeneration(format!("RSA key generation failed: {e}")))?;
        let public = EncryptionKey::from_public_key(private.public_key())?;
        Ok((Self::from_private_key(private)?, public))
    }

    fn unwrap_key(&self, wrapped: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut out = vec![0u8; self.key.min_output_size()];
        let content_key = self
            .key
            .decrypt(&OAEP_SHA256_MGF1SHA256, wrapped, &mut out, None)
            .map_err(|_| CryptoError::Decryption)?;
        Ok(content_key.to_vec())
    }
}

/// An encrypted payload with its wrapped content key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    /// Content encryption algorithm.
    pub algorithm: DataEncryptionAlgorithm,
    /// Content key wrapped with RSA-OAEP.
    pub encrypted_key: Vec<u8>,
    /// AES-GCM nonce.
    pub nonce: Vec<u8>,
    /// Ciphertext with the GCM tag appended.
    pub ciphertext: Vec<u8>,
}

/// Encrypts `plaintext` for the holder of `recipient`'s private key.
///
/// # Errors
///
/// Returns an error if randomness or the underlying primitives fail.
pub fn seal(
    recipient: &EncryptionKey,
    algorithm: DataEncryptionAlgorithm,
    plaintext: &[u8],
) -> Result<SealedPayload, CryptoError> {
    let rng = SystemRandom::new();

    let mut key_bytes = vec![0u8; algorithm.key_len()];
    rng.fill(&mut key_bytes)
        .map_err(|_| CryptoError::Encryption("random content key".to_string()))?;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| CryptoError::Encryption("random nonce".to_string()))?;

    let content_key = algorithm
        .content_key(&key_bytes)
        .map_err(|_| CryptoError::Encryption("content key setup".to_string()))?;

    let mut in_out = plaintext.to_vec();
    content_key
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|e| CryptoError::Encryption(format!("content encryption failed: {e}")))?;

    let encrypted_key = recipient.wrap(&key_bytes)?;

    Ok(SealedPayload {
        algorithm,
        encrypted_key,
        nonce: nonce_bytes.to_vec(),
        ciphertext: in_out,
    })
}

/// Decrypts a payload produced by [`seal`].
///
/// # Errors
///
/// Returns [`CryptoError::Decryption`] for any failure, without detail.
pub fn open(key: &DecryptionKey, sealed: &SealedPayload) -> Result<Vec<u8>, CryptoError> {
    let key_bytes = key.unwrap_key(&sealed.encrypted_key)?;
    if key_bytes.len() != sealed.algorithm.key_len() {
        return Err(CryptoError::Decryption);
    }

    let content_key = sealed.algorithm.content_key(&key_bytes)?;
    let nonce =
        Nonce::try_assume_unique_for_key(&sealed.nonce).map_err(|_| CryptoError::Decryption)?;

    let mut in_out = sealed.ciphertext.clone();
    let plaintext = content_key
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| CryptoError::Decryption)?;

    Ok(plaintext.to_vec())
}

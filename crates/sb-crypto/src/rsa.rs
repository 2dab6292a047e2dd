//! RSA signing and verification for XML digital signatures.
//!
//! XML-DSig deployments in the SAML world overwhelmingly use RSA PKCS#1 v1.5
//! with SHA-256, so that is the default. SHA-1 is not offered at all.

use aws_lc_rs::{
    rand::SystemRandom,
    rsa::KeySize,
    signature::{self, KeyPair, RsaKeyPair, UnparsedPublicKey},
};

use crate::error::CryptoError;
use crate::pem::pem_to_der;

/// RSA signature algorithms accepted for XML-DSig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RsaSignatureAlgorithm {
    /// RSA PKCS#1 v1.5 with SHA-256.
    #[default]
    RsaSha256,
    /// RSA PKCS#1 v1.5 with SHA-384.
    RsaSha384,
    /// RSA PKCS#1 v1.5 with SHA-512.
    RsaSha512,
}

impl RsaSignatureAlgorithm {
    /// Returns the XML-DSig algorithm URI.
    #[must_use]
    pub const fn xml_dsig_uri(self) -> &'static str {
        match self {
            Self::RsaSha256 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256",
            Self::RsaSha384 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384",
            Self::RsaSha512 => "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512",
        }
    }

    fn verification_algorithm(self) -> &'static dyn signature::VerificationAlgorithm {
        match self {
            Self::RsaSha256 => &signature::RSA_PKCS1_2048_8192_SHA256,
            Self::RsaSha384 => &signature::RSA_PKCS1_2048_8192_SHA384,
            Self::RsaSha512 => &signature::RSA_PKCS1_2048_8192_SHA512,
        }
    }
}

/// RSA private key used to sign outbound responses.
pub struct SigningKey {
    key_pair: RsaKeyPair,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("modulus_bits", &(self.key_pair.public_modulus_len() * 8))
            .finish_non_exhaustive()
    }
}

impl SigningKey {
    /// Creates a signing key from a PKCS#8 DER-encoded private key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be parsed.
    pub fn from_pkcs8(pkcs8_der: &[u8]) -> Result<Self, CryptoError> {
        let key_pair = RsaKeyPair::from_pkcs8(pkcs8_der)
            .map_err(|e| CryptoError::InvalidKey(format!("invalid RSA PKCS#8 key: {e}")))?;
        Ok(Self { key_pair })
    }

    /// Creates a signing key from a PKCS#1 or PKCS#8 DER-encoded private key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be parsed in either format.
    pub fn from_der(der: &[u8]) -> Result<Self, CryptoError> {
        let key_pair = RsaKeyPair::from_der(der)
            .or_else(|_| RsaKeyPair::from_pkcs8(der))
            .map_err(|e| CryptoError::InvalidKey(format!("invalid RSA key: {e}")))?;
        Ok(Self { key_pair })
    }

    /// Creates a signing key from a PEM-encoded private key.
    ///
    /// # Errors
    ///
    /// Returns an error if no private key block is present or it cannot be parsed.
    pub fn from_pem(pem: &str) -> Result<Self, CryptoError> {
        let der = pem_to_der(pem, "PRIVATE KEY")
            .or_else(|| pem_to_der(pem, "RSA PRIVATE KEY"))
            .ok_or_else(|| CryptoError::InvalidKey("no private key PEM block".to_string()))?;
        Self::from_der(&der)
    }

    /// Wraps an already loaded key pair.
    #[must_use]
    pub const fn from_key_pair(key_pair: RsaKeyPair) -> Self {
        Self { key_pair }
    }

    /// Generates a fresh RSA key pair.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation fails.
    pub fn generate(size: KeySize) -> Result<Self, CryptoError> {
        let key_pair = RsaKeyPair::generate(size)
            .map_err(|e| CryptoError::KeyGeneration(format!("RSA key generation failed: {e}")))?;
        Ok(Self { key_pair })
    }

    /// Returns the DER-encoded public key (PKCS#1 `RSAPublicKey`).
    #[must_use]
    pub fn public_key_der(&self) -> Vec<u8> {
        self.key_pair.public_key().as_ref().to_vec()
    }

    /// Signs `data` with the given algorithm.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn sign(&self, data: &[u8], algorithm: RsaSignatureAlgorithm) -> Result<Vec<u8>, CryptoError> {
        let rng = SystemRandom::new();
        let mut signature = vec![0u8; self.key_pair.public_modulus_len()];

        let padding = match algorithm {
            RsaSignatureAlgorithm::RsaSha256 => &signature::RSA_PKCS1_SHA256,
            RsaSignatureAlgorithm::RsaSha384 => &signature::RSA_PKCS1_SHA384,
            RsaSignatureAlgorithm::RsaSha512 => &signature::RSA_PKCS1_SHA512,
        };

        self.key_pair
            .sign(padding, &rng, data, &mut signature)
            .map_err(|e| CryptoError::Signing(format!("RSA signing failed: {e}")))?;

        Ok(signature)
    }
}

/// Verifies an RSA signature.
///
/// `public_key_der` is either a PKCS#1 `RSAPublicKey` or an X.509
/// `SubjectPublicKeyInfo`.
///
/// # Errors
///
/// Never fails today; a bad signature is `Ok(false)`. The `Result` leaves room
/// for algorithm negotiation errors.
pub fn rsa_verify(
    public_key_der: &[u8],
    data: &[u8],
    sig: &[u8],
    algorithm: RsaSignatureAlgorithm,
) -> Result<bool, CryptoError> {
    let public_key = UnparsedPublicKey::new(algorithm.verification_algorithm(), public_key_der);

    match public_key.verify(data, sig) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

//! Assertion encryption.
//!
//! The serialized assertion is sealed with a fresh AES-GCM content key that
//! is wrapped for the recipient with RSA-OAEP. The result is carried as an
//! `EncryptedAssertion`: the data cipher value is `nonce || ciphertext+tag`
//! and the key cipher value is the wrapped content key, both base64.

use base64::Engine;
use sb_crypto::encryption::KEY_TRANSPORT_RSA_OAEP;
use sb_crypto::{DataEncryptionAlgorithm, DecryptionKey, EncryptionKey, SealedPayload};

use crate::error::{SamlError, SamlResult};
use crate::types::{
    Assertion, CipherData, EncryptedAssertion, EncryptedData, EncryptedKey, EncryptionMethod,
    KeyInfo, XMLENC_ELEMENT_TYPE,
};
use crate::wire;

/// AES-GCM nonce length.
const GCM_NONCE_LEN: usize = 12;

/// Encrypts `assertion` for the holder of `recipient`'s private key.
///
/// # Errors
///
/// Returns an error if serialization or encryption fails.
pub fn encrypt_assertion(
    assertion: &Assertion,
    recipient: &EncryptionKey,
    algorithm: DataEncryptionAlgorithm,
) -> SamlResult<EncryptedAssertion> {
    let xml = wire::assertion_to_xml(assertion)?;
    let sealed = sb_crypto::seal(recipient, algorithm, xml.as_bytes())
        .map_err(|e| SamlError::Encryption(e.to_string()))?;

    let engine = base64::engine::general_purpose::STANDARD;
    let mut data = sealed.nonce;
    data.extend_from_slice(&sealed.ciphertext);

    Ok(EncryptedAssertion {
        encrypted_data: EncryptedData {
            data_type: Some(XMLENC_ELEMENT_TYPE.to_string()),
            encryption_method: EncryptionMethod {
                algorithm: algorithm.uri().to_string(),
            },
            key_info: KeyInfo {
                encrypted_key: EncryptedKey {
                    encryption_method: EncryptionMethod {
                        algorithm: KEY_TRANSPORT_RSA_OAEP.to_string(),
                    },
                    cipher_data: CipherData {
                        cipher_value: engine.encode(&sealed.encrypted_key),
                    },
                },
            },
            cipher_data: CipherData {
                cipher_value: engine.encode(data),
            },
        },
    })
}

/// Decrypts an encrypted assertion.
///
/// Every cryptographic failure is reported as [`SamlError::Decryption`]
/// without detail.
///
/// # Errors
///
/// Returns [`SamlError::Decryption`] if the content cannot be decrypted, or
/// a parse error if the plaintext is not an assertion.
pub fn decrypt_assertion(
    encrypted: &EncryptedAssertion,
    key: &DecryptionKey,
) -> SamlResult<Assertion> {
    let data = &encrypted.encrypted_data;
    let algorithm = DataEncryptionAlgorithm::from_uri(&data.encryption_method.algorithm)
        .ok_or(SamlError::Decryption)?;
    if data.key_info.encrypted_key.encryption_method.algorithm != KEY_TRANSPORT_RSA_OAEP {
        return Err(SamlError::Decryption);
    }

    let encrypted_key = decode(&data.key_info.encrypted_key.cipher_data.cipher_value)?;
    let mut payload = decode(&data.cipher_data.cipher_value)?;
    if payload.len() <= GCM_NONCE_LEN {
        return Err(SamlError::Decryption);
    }
    let ciphertext = payload.split_off(GCM_NONCE_LEN);

    let sealed = SealedPayload {
        algorithm,
        encrypted_key,
        nonce: payload,
        ciphertext,
    };
    let plaintext = sb_crypto::open(key, &sealed).map_err(|_| SamlError::Decryption)?;
    let xml = String::from_utf8(plaintext).map_err(|_| SamlError::Decryption)?;

    wire::assertion_from_xml(&xml)
}

fn decode(value: &str) -> SamlResult<Vec<u8>> {
    let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|_| SamlError::Decryption)
}

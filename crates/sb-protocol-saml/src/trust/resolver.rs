//! Derives trust policies from metadata and key material.

use std::fmt;
use std::sync::Arc;

use sb_core::KeyMaterial;
use sb_crypto::{DataEncryptionAlgorithm, DecryptionKey, KeyStore, SigningKey};

use crate::error::{SamlError, SamlResult};
use crate::metadata::MetadataProvider;
use crate::signature::{SignatureAlgorithm, SignatureCriteria};
use crate::types::{SamlBinding, SamlVersion};

use super::{InboundPolicy, OutboundPolicy};

/// Resolves per-partner trust policies.
///
/// Key material is all-or-nothing. A reference with every field set is
/// loaded (and must load). An empty reference means "not configured". A
/// partially filled reference is treated as not configured and logged at
/// `warn`, so a typo downgrades to unsigned or unencrypted traffic.
pub struct TrustPolicyResolver {
    metadata: Arc<dyn MetadataProvider>,
    key_store: Arc<dyn KeyStore>,
    signing_key: KeyMaterial,
    decryption_key: KeyMaterial,
}

impl fmt::Debug for TrustPolicyResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustPolicyResolver")
            .field("metadata", &self.metadata)
            .field("signing_key", &self.signing_key)
            .field("decryption_key", &self.decryption_key)
            .finish_non_exhaustive()
    }
}

impl TrustPolicyResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        key_store: Arc<dyn KeyStore>,
        signing_key: KeyMaterial,
        decryption_key: KeyMaterial,
    ) -> Self {
        Self {
            metadata,
            key_store,
            signing_key,
            decryption_key,
        }
    }

    /// The metadata provider.
    #[must_use]
    pub fn metadata(&self) -> &Arc<dyn MetadataProvider> {
        &self.metadata
    }

    /// Outbound policy for `sp` over the HTTP-POST binding.
    ///
    /// # Errors
    ///
    /// See [`resolve_outbound_policy_for`](Self::resolve_outbound_policy_for).
    pub fn resolve_outbound_policy(&self, sp: &str) -> SamlResult<OutboundPolicy> {
        self.resolve_outbound_policy_for(sp, SamlBinding::HttpPost)
    }

    /// Outbound policy for `sp` over `binding`.
    ///
    /// # Errors
    ///
    /// Fails when `sp` has no metadata or no endpoint for `binding`, when
    /// complete key material cannot be loaded, when the declared encryption
    /// algorithm is unsupported, or when encryption is declared without an
    /// encryption credential.
    pub fn resolve_outbound_policy_for(
        &self,
        sp: &str,
        binding: SamlBinding,
    ) -> SamlResult<OutboundPolicy> {
        if !self.metadata.has_entity(sp) {
            return Err(SamlError::UnknownServiceProvider(sp.to_string()));
        }

        let destination_url =
            self.metadata
                .destination_url(sp, binding)
                .ok_or_else(|| SamlError::MissingEndpoint {
                    entity_id: sp.to_string(),
                    binding: binding.name(),
                })?;

        let signing_credential = self.load_signing_key(sp)?;

        let mut encryption_algorithm = None;
        let mut encryption_credential = None;
        if let Some(uri) = self.metadata.encryption_algorithm(sp) {
            let algorithm = DataEncryptionAlgorithm::from_uri(&uri).ok_or_else(|| {
                SamlError::UnsupportedAlgorithm(format!("{sp} declares encryption algorithm {uri}"))
            })?;
            if self.signing_key.is_complete() {
                let credential = self.metadata.encryption_credential(sp).ok_or_else(|| {
                    SamlError::Metadata(format!(
                        "{sp} declares encryption but publishes no encryption credential"
                    ))
                })?;
                encryption_algorithm = Some(algorithm);
                encryption_credential = Some(credential);
            } else {
                tracing::debug!(sp, "no complete key material, assertions go unencrypted");
            }
        }

        let policy = OutboundPolicy {
            sp_entity_id: sp.to_string(),
            must_sign: signing_credential.is_some(),
            signing_credential,
            signature_algorithm: SignatureAlgorithm::default(),
            must_encrypt: encryption_credential.is_some(),
            encryption_algorithm,
            encryption_credential,
            destination_url,
        };

        tracing::debug!(
            sp,
            must_sign = policy.must_sign,
            must_encrypt = policy.must_encrypt,
            "resolved outbound trust policy"
        );
        Ok(policy)
    }

    /// Inbound policy for `idp` speaking `protocol`.
    ///
    /// # Errors
    ///
    /// Fails when `idp` has no metadata or complete decryption key material
    /// cannot be loaded.
    pub fn resolve_inbound_policy(
        &self,
        idp: &str,
        protocol: SamlVersion,
    ) -> SamlResult<InboundPolicy> {
        if !self.metadata.has_entity(idp) {
            return Err(SamlError::UnknownIdentityProvider(idp.to_string()));
        }

        let expects_signature = self.metadata.signing_expectation(idp);
        let verification_trust_engine =
            expects_signature.then(|| self.metadata.verification_trust_engine());

        let decryption_credential = self.load_decryption_key(idp)?;

        let policy = InboundPolicy {
            idp_entity_id: idp.to_string(),
            protocol,
            expects_signature,
            verification_trust_engine,
            signature_criteria: SignatureCriteria::new(idp, protocol),
            expects_encryption: decryption_credential.is_some(),
            decryption_credential,
        };

        tracing::debug!(
            idp,
            protocol = %protocol,
            expects_signature = policy.expects_signature,
            expects_encryption = policy.expects_encryption,
            "resolved inbound trust policy"
        );
        Ok(policy)
    }

    fn load_signing_key(&self, sp: &str) -> SamlResult<Option<Arc<SigningKey>>> {
        if !usable(&self.signing_key, "signing", sp) {
            return Ok(None);
        }
        self.key_store
            .signing_key(&self.signing_key)
            .map(Some)
            .map_err(|e| SamlError::KeyMaterial(format!("signing key: {e}")))
    }

    fn load_decryption_key(&self, idp: &str) -> SamlResult<Option<Arc<DecryptionKey>>> {
        if !usable(&self.decryption_key, "decryption", idp) {
            return Ok(None);
        }
        self.key_store
            .decryption_key(&self.decryption_key)
            .map(Some)
            .map_err(|e| SamlError::KeyMaterial(format!("decryption key: {e}")))
    }
}

/// Whether `material` is complete; warns about partial references.
fn usable(material: &KeyMaterial, purpose: &str, partner: &str) -> bool {
    if material.is_complete() {
        return true;
    }
    if material.is_partial() {
        tracing::warn!(
            partner,
            purpose,
            missing = ?material.missing_fields(),
            "incomplete key material, continuing without it"
        );
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_lc_rs::rsa::KeySize;
    use sb_crypto::{InMemoryKeyStore, SigningKey};

    use crate::metadata::{EntityMetadata, StaticMetadataProvider};

    const SP: &str = "https://sp.example.com";
    const AES256_GCM: &str = "http://www.w3.org/2009/xmlenc11#aes256-gcm";

    fn key_store() -> Arc<InMemoryKeyStore> {
        let store = InMemoryKeyStore::new();
        store.create_store("idp-keys", "changeit");
        store
            .insert_signing_key(
                "idp-keys",
                "signing",
                "keypass",
                SigningKey::generate(KeySize::Rsa2048).unwrap(),
            )
            .unwrap();
        let (decryption, _) = DecryptionKey::generate(KeySize::Rsa2048).unwrap();
        store
            .insert_decryption_key("idp-keys", "decryption", "keypass", decryption)
            .unwrap();
        Arc::new(store)
    }

    fn metadata(sp: EntityMetadata) -> Arc<StaticMetadataProvider> {
        Arc::new(
            StaticMetadataProvider::new()
                .with_entity(sp)
                .with_entity(EntityMetadata::new("idp_saml2").signs_messages(true))
                .with_entity(EntityMetadata::new("idp_saml11")),
        )
    }

    fn plain_sp() -> EntityMetadata {
        EntityMetadata::new(SP).with_endpoint(SamlBinding::HttpPost, "https://sp.example.com/acs")
    }

    fn signing() -> KeyMaterial {
        KeyMaterial::new("idp-keys", "changeit", "signing", "keypass")
    }

    fn decryption() -> KeyMaterial {
        KeyMaterial::new("idp-keys", "changeit", "decryption", "keypass")
    }

    fn resolver(sp: EntityMetadata, signing: KeyMaterial, decryption: KeyMaterial) -> TrustPolicyResolver {
        TrustPolicyResolver::new(metadata(sp), key_store(), signing, decryption)
    }

    #[test]
    fn complete_material_signs() {
        let policy = resolver(plain_sp(), signing(), KeyMaterial::default())
            .resolve_outbound_policy(SP)
            .unwrap();
        assert!(policy.must_sign);
        assert!(policy.signing_credential.is_some());
        assert!(!policy.must_encrypt);
        assert_eq!(policy.destination_url, "https://sp.example.com/acs");
    }

    #[test]
    fn any_missing_field_disables_signing() {
        let complete = signing();
        let partials = [
            KeyMaterial { store: None, ..complete.clone() },
            KeyMaterial { store_password: None, ..complete.clone() },
            KeyMaterial { alias: None, ..complete.clone() },
            KeyMaterial { key_password: None, ..complete },
        ];
        for partial in partials {
            let policy = resolver(plain_sp(), partial, KeyMaterial::default())
                .resolve_outbound_policy(SP)
                .unwrap();
            assert!(!policy.must_sign);
            assert!(policy.signing_credential.is_none());
        }
    }

    #[test]
    fn wrong_password_is_a_configuration_error() {
        let material = KeyMaterial::new("idp-keys", "wrong", "signing", "keypass");
        let err = resolver(plain_sp(), material, KeyMaterial::default())
            .resolve_outbound_policy(SP)
            .unwrap_err();
        assert!(matches!(err, SamlError::KeyMaterial(_)));
        assert!(err.is_configuration());
        assert!(!err.to_string().contains("wrong"));
    }

    #[test]
    fn encryption_requires_algorithm_credential_and_material() {
        let (_, public) = DecryptionKey::generate(KeySize::Rsa2048).unwrap();
        let sp = plain_sp()
            .with_encryption_algorithm(AES256_GCM)
            .with_encryption_credential(Arc::new(public));

        let policy = resolver(sp.clone(), signing(), KeyMaterial::default())
            .resolve_outbound_policy(SP)
            .unwrap();
        assert!(policy.must_encrypt);
        assert_eq!(policy.encryption_algorithm, Some(DataEncryptionAlgorithm::Aes256Gcm));

        let policy = resolver(sp, KeyMaterial::default(), KeyMaterial::default())
            .resolve_outbound_policy(SP)
            .unwrap();
        assert!(!policy.must_encrypt);
        assert!(!policy.must_sign);
    }

    #[test]
    fn declared_encryption_without_credential_fails() {
        let sp = plain_sp().with_encryption_algorithm(AES256_GCM);
        let err = resolver(sp, signing(), KeyMaterial::default())
            .resolve_outbound_policy(SP)
            .unwrap_err();
        assert!(matches!(err, SamlError::Metadata(_)));
    }

    #[test]
    fn unsupported_encryption_algorithm_fails() {
        let sp = plain_sp().with_encryption_algorithm("http://www.w3.org/2001/04/xmlenc#aes128-cbc");
        let err = resolver(sp, signing(), KeyMaterial::default())
            .resolve_outbound_policy(SP)
            .unwrap_err();
        assert!(matches!(err, SamlError::UnsupportedAlgorithm(_)));
    }

    #[test]
    fn unknown_partners_and_missing_endpoints() {
        let resolver = resolver(plain_sp(), signing(), KeyMaterial::default());
        assert!(matches!(
            resolver.resolve_outbound_policy("https://nobody.example"),
            Err(SamlError::UnknownServiceProvider(_))
        ));
        assert!(matches!(
            resolver.resolve_outbound_policy_for(SP, SamlBinding::HttpRedirect),
            Err(SamlError::MissingEndpoint { .. })
        ));
        assert!(matches!(
            resolver.resolve_inbound_policy("idp_unknown", SamlVersion::V2_0),
            Err(SamlError::UnknownIdentityProvider(_))
        ));
    }

    #[test]
    fn inbound_policy_follows_metadata_and_material() {
        let resolver = resolver(plain_sp(), KeyMaterial::default(), decryption());

        let signed = resolver.resolve_inbound_policy("idp_saml2", SamlVersion::V2_0).unwrap();
        assert!(signed.expects_signature);
        assert!(signed.verification_trust_engine.is_some());
        assert!(signed.expects_encryption);
        assert_eq!(signed.signature_criteria.entity_id, "idp_saml2");

        let unsigned = resolver.resolve_inbound_policy("idp_saml11", SamlVersion::V1_1).unwrap();
        assert!(!unsigned.expects_signature);
        assert!(unsigned.verification_trust_engine.is_none());
        assert_eq!(unsigned.protocol, SamlVersion::V1_1);
    }

    #[test]
    fn partial_decryption_material_downgrades() {
        let partial = KeyMaterial { alias: None, ..decryption() };
        let policy = resolver(plain_sp(), KeyMaterial::default(), partial)
            .resolve_inbound_policy("idp_saml2", SamlVersion::V2_0)
            .unwrap();
        assert!(!policy.expects_encryption);
        assert!(policy.decryption_credential.is_none());
    }
}

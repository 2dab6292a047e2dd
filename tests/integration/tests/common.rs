//! Shared fixtures.

use std::sync::Arc;

use aws_lc_rs::rsa::KeySize;
use chrono::Duration;
use sb_core::KeyMaterial;
use sb_crypto::{DataEncryptionAlgorithm, DecryptionKey, InMemoryKeyStore, SigningKey};
use sb_protocol_saml::audit::InMemoryAuditSink;
use sb_protocol_saml::facade::{
    ConsumerFacade, ConsumerSettings, Partners, ProducerFacade, ProducerSettings,
};
use sb_protocol_saml::metadata::{EntityMetadata, StaticMetadataProvider};
use sb_protocol_saml::overrides::PartnerStrategies;
use sb_protocol_saml::signature::VerificationCredential;
use sb_protocol_saml::translation::EntityTranslator;
use sb_protocol_saml::validation::{ReplayGuard, SeenResponseLedger};
use sb_protocol_saml::{SamlBinding, SamlVersion};

pub const IDP: &str = "https://idp.example.com";
pub const SP: &str = "https://sp.example.com";
pub const ACS: &str = "https://sp.example.com/acs";

/// How the two parties are configured.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub protocol: SamlVersion,
    pub sign: bool,
    pub encrypt: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            protocol: SamlVersion::V2_0,
            sign: true,
            encrypt: false,
        }
    }
}

/// An identity provider and a service provider that trust each other.
pub struct Federation {
    pub options: Options,
    /// What the identity provider knows about the service provider.
    pub sp_metadata: Arc<StaticMetadataProvider>,
    /// What the service provider knows about the identity provider.
    pub idp_metadata: Arc<StaticMetadataProvider>,
    pub idp_keys: Arc<InMemoryKeyStore>,
    pub sp_keys: Arc<InMemoryKeyStore>,
    pub idp_audit: Arc<InMemoryAuditSink>,
    pub sp_audit: Arc<InMemoryAuditSink>,
    pub ledger: Arc<SeenResponseLedger>,
}

impl Federation {
    pub fn new(options: Options) -> anyhow::Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("sb_protocol_saml=debug")
            .with_test_writer()
            .try_init();

        let signing = SigningKey::generate(KeySize::Rsa2048)?;
        let idp_public_key = signing.public_key_der();
        let idp_keys = InMemoryKeyStore::new();
        idp_keys.create_store("idp-keys", "changeit");
        idp_keys.insert_signing_key("idp-keys", "signing", "keypass", signing)?;

        let (decryption, encryption) = DecryptionKey::generate(KeySize::Rsa2048)?;
        let sp_keys = InMemoryKeyStore::new();
        sp_keys.create_store("sp-keys", "changeit");
        sp_keys.insert_decryption_key("sp-keys", "decryption", "keypass", decryption)?;

        let mut sp = EntityMetadata::new(SP).with_endpoint(SamlBinding::HttpPost, ACS);
        if options.encrypt {
            sp = sp
                .with_encryption_algorithm(DataEncryptionAlgorithm::Aes256Gcm.uri())
                .with_encryption_credential(Arc::new(encryption));
        }

        let idp = EntityMetadata::new(IDP)
            .signs_messages(options.sign)
            .with_verification_credential(VerificationCredential::from_public_key_der(idp_public_key));

        Ok(Self {
            options,
            sp_metadata: Arc::new(StaticMetadataProvider::new().with_entity(sp)),
            idp_metadata: Arc::new(StaticMetadataProvider::new().with_entity(idp)),
            idp_keys: Arc::new(idp_keys),
            sp_keys: Arc::new(sp_keys),
            idp_audit: Arc::new(InMemoryAuditSink::new()),
            sp_audit: Arc::new(InMemoryAuditSink::new()),
            ledger: SeenResponseLedger::shared(),
        })
    }

    pub fn producer_with(&self, signing_key: KeyMaterial) -> anyhow::Result<ProducerFacade> {
        let strategies = PartnerStrategies::new(self.sp_metadata.clone())
            .with_default_audit_sink(self.idp_audit.clone());
        let settings = ProducerSettings {
            issuer: IDP.to_string(),
            protocol: self.options.protocol,
            assertion_validity: Duration::minutes(30),
            signing_key,
            binding: SamlBinding::HttpPost,
        };
        Ok(ProducerFacade::new(
            settings,
            self.idp_keys.clone(),
            Partners::new(Arc::new(strategies), Arc::new(EntityTranslator::new())),
            [SP],
        )?)
    }

    pub fn producer(&self) -> anyhow::Result<ProducerFacade> {
        let material = if self.options.sign || self.options.encrypt {
            signing_material()
        } else {
            KeyMaterial::default()
        };
        self.producer_with(material)
    }

    pub fn consumer_with(&self, partners: Partners) -> anyhow::Result<ConsumerFacade> {
        let settings = ConsumerSettings {
            protocol: self.options.protocol,
            decryption_key: if self.options.encrypt {
                decryption_material()
            } else {
                KeyMaterial::default()
            },
        };
        Ok(ConsumerFacade::new(
            settings,
            self.sp_keys.clone(),
            partners,
            ReplayGuard::new(self.ledger.clone(), 30)?,
            [IDP],
        )?)
    }

    pub fn partners(&self) -> Partners {
        let strategies = PartnerStrategies::new(self.idp_metadata.clone())
            .with_default_audit_sink(self.sp_audit.clone());
        Partners::new(Arc::new(strategies), Arc::new(EntityTranslator::new()))
    }

    pub fn consumer(&self) -> anyhow::Result<ConsumerFacade> {
        self.consumer_with(self.partners())
    }
}

pub fn signing_material() -> KeyMaterial {
    KeyMaterial::new("idp-keys", "changeit", "signing", "keypass")
}

pub fn decryption_material() -> KeyMaterial {
    KeyMaterial::new("sp-keys", "changeit", "decryption", "keypass")
}

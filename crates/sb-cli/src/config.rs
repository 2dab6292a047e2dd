//! Assembles library collaborators from CLI arguments and the environment.

use std::path::Path;
use std::sync::Arc;

use sb_core::Config;
use sb_crypto::{InMemoryKeyStore, KeyStore};
use sb_protocol_saml::facade::Partners;
use sb_protocol_saml::metadata::{MetadataProvider, StaticMetadataProvider};
use sb_protocol_saml::overrides::PartnerStrategies;
use sb_protocol_saml::translation::EntityTranslator;

use crate::cli::Cli;
use crate::keystore::KeyStoreFile;
use crate::{CliError, CliResult};

/// Everything a command may need.
#[derive(Debug)]
pub struct CliConfig {
    /// `SB_*` settings.
    pub settings: Config,
    /// Partner code translation.
    pub translator: Arc<EntityTranslator>,
    metadata: Option<Arc<StaticMetadataProvider>>,
    key_store: Arc<InMemoryKeyStore>,
}

impl CliConfig {
    /// Loads settings from the environment and the files named on the
    /// command line.
    ///
    /// # Errors
    ///
    /// Returns an error if any named file cannot be read or parsed.
    pub fn load(cli: &Cli) -> CliResult<Self> {
        let settings = Config::from_env()?;

        let translator = match &cli.translations {
            Some(path) => EntityTranslator::from_json(&read(path)?)?,
            None => EntityTranslator::new(),
        };

        let metadata = match &cli.metadata {
            Some(path) => Some(Arc::new(StaticMetadataProvider::from_json(&read(path)?)?)),
            None => None,
        };

        let key_store = match &cli.keystore {
            Some(path) => {
                let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
                KeyStoreFile::from_json(&read(path)?)?.load(base_dir)?
            }
            None => InMemoryKeyStore::new(),
        };

        Ok(Self {
            settings,
            translator: Arc::new(translator),
            metadata,
            key_store: Arc::new(key_store),
        })
    }

    /// Partner metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if no metadata document was given.
    pub fn metadata(&self) -> CliResult<Arc<StaticMetadataProvider>> {
        self.metadata
            .clone()
            .ok_or_else(|| CliError::Config("--metadata (or SB_METADATA) is required".to_string()))
    }

    /// The key store.
    pub fn key_store(&self) -> Arc<dyn KeyStore> {
        Arc::clone(&self.key_store) as Arc<dyn KeyStore>
    }

    /// Per-partner collaborators over the loaded metadata.
    ///
    /// # Errors
    ///
    /// Returns an error if no metadata document was given.
    pub fn partners(&self) -> CliResult<Partners> {
        let metadata: Arc<dyn MetadataProvider> = self.metadata()?;
        Ok(Partners::new(
            Arc::new(PartnerStrategies::new(metadata)),
            Arc::clone(&self.translator),
        ))
    }

    /// Accepts either an entity id or a partner code.
    pub fn entity_id<'a>(&'a self, partner: &'a str) -> &'a str {
        self.translator.lookup_entity_identifier(partner)
    }
}

fn read(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| CliError::Config(format!("cannot read {}: {e}", path.display())))
}

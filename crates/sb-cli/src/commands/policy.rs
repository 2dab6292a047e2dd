//! Trust policy inspection.

use serde::Serialize;

use sb_protocol_saml::trust::{InboundPolicy, OutboundPolicy, TrustPolicyResolver};
use sb_protocol_saml::SamlVersion;

use crate::cli::{OutputFormat, PolicyCommand};
use crate::output::output_single;
use crate::CliConfig;

/// Outbound policy as printed.
#[derive(Debug, Serialize)]
pub struct OutboundSummary {
    sp: String,
    destination: String,
    must_sign: bool,
    signature_algorithm: Option<&'static str>,
    must_encrypt: bool,
    encryption_algorithm: Option<&'static str>,
}

impl From<&OutboundPolicy> for OutboundSummary {
    fn from(policy: &OutboundPolicy) -> Self {
        Self {
            sp: policy.sp_entity_id.clone(),
            destination: policy.destination_url.clone(),
            must_sign: policy.must_sign,
            signature_algorithm: policy.must_sign.then(|| policy.signature_algorithm.uri()),
            must_encrypt: policy.must_encrypt,
            encryption_algorithm: policy.encryption_algorithm.map(|a| a.uri()),
        }
    }
}

/// Inbound policy as printed.
#[derive(Debug, Serialize)]
pub struct InboundSummary {
    idp: String,
    protocol: String,
    expects_signature: bool,
    allowed_signature_algorithms: Vec<&'static str>,
    expects_encryption: bool,
}

impl From<&InboundPolicy> for InboundSummary {
    fn from(policy: &InboundPolicy) -> Self {
        Self {
            idp: policy.idp_entity_id.clone(),
            protocol: policy.protocol.to_string(),
            expects_signature: policy.expects_signature,
            allowed_signature_algorithms: if policy.expects_signature {
                policy
                    .signature_criteria
                    .allowed_algorithms
                    .iter()
                    .map(|a| a.uri())
                    .collect()
            } else {
                Vec::new()
            },
            expects_encryption: policy.expects_encryption,
        }
    }
}

/// Runs a policy command.
pub fn run_policy(cmd: PolicyCommand, config: &CliConfig, format: OutputFormat) -> crate::CliResult<()> {
    let resolver = TrustPolicyResolver::new(
        config.metadata()?,
        config.key_store(),
        config.settings.producer.signing_key.clone(),
        config.settings.consumer.decryption_key.clone(),
    );

    match cmd {
        PolicyCommand::Outbound { sp } => {
            let policy = resolver.resolve_outbound_policy(config.entity_id(&sp))?;
            output_single(&OutboundSummary::from(&policy), format)
        }
        PolicyCommand::Inbound { idp, protocol } => {
            let protocol: SamlVersion = protocol
                .as_deref()
                .unwrap_or(&config.settings.consumer.protocol)
                .parse()?;
            let policy = resolver.resolve_inbound_policy(config.entity_id(&idp), protocol)?;
            output_single(&InboundSummary::from(&policy), format)
        }
    }
}

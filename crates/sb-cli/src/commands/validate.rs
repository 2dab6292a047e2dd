//! Offline payload validation.

use serde::Serialize;

use sb_protocol_saml::facade::ConsumerFacade;
use sb_protocol_saml::validation::SeenResponseLedger;
use sb_protocol_saml::{AttributeMap, AuthenticatedPrincipal};

use crate::cli::{OutputFormat, ValidateArgs};
use crate::output::{output_single, success};
use crate::CliConfig;

#[derive(Debug, Serialize)]
struct Accepted<'a> {
    issuer: &'a str,
    subject: &'a str,
    response_id: &'a str,
    assertion_id: &'a str,
    attributes: &'a AttributeMap,
}

impl<'a> From<&'a AuthenticatedPrincipal> for Accepted<'a> {
    fn from(principal: &'a AuthenticatedPrincipal) -> Self {
        Self {
            issuer: &principal.issuer,
            subject: &principal.subject,
            response_id: &principal.response_id,
            assertion_id: &principal.assertion_id,
            attributes: &principal.attributes,
        }
    }
}

/// Runs the consumer pipeline over a payload file.
pub fn run_validate(args: ValidateArgs, config: &CliConfig, format: OutputFormat) -> crate::CliResult<()> {
    let idp = config.entity_id(&args.idp);
    let payload = std::fs::read_to_string(&args.payload)?;

    let consumer = ConsumerFacade::from_config(
        &config.settings,
        config.key_store(),
        config.partners()?,
        SeenResponseLedger::shared(),
        [idp],
    )?;

    let principal = consumer.consume(idp, payload.trim(), args.in_response_to.as_deref())?;

    if format == OutputFormat::Table {
        success(&format!("response {} accepted", principal.response_id));
    }
    output_single(&Accepted::from(&principal), format)
}

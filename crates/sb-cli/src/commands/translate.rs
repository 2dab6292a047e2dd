//! Partner code translation.

use serde::Serialize;

use crate::cli::{OutputFormat, TranslateCommand};
use crate::output::{output_single, warning};
use crate::CliConfig;

#[derive(Debug, Serialize)]
struct Translation<'a> {
    code: &'a str,
    entity_id: &'a str,
}

/// Runs a translate command.
pub fn run_translate(cmd: TranslateCommand, config: &CliConfig, format: OutputFormat) -> crate::CliResult<()> {
    let translator = &config.translator;
    let translation = match &cmd {
        TranslateCommand::Code { code } => Translation {
            code,
            entity_id: translator.lookup_entity_identifier(code),
        },
        TranslateCommand::Entity { entity_id } => Translation {
            code: translator.lookup_internal_code(entity_id),
            entity_id,
        },
    };

    if translation.code == translation.entity_id && format != OutputFormat::Quiet {
        warning("no mapping, value passed through unchanged");
    }
    output_single(&translation, format)
}

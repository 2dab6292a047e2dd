//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// sbctl - inspect trust policies and check SAML payloads.
#[derive(Debug, Parser)]
#[command(name = "sbctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Partner metadata document (JSON).
    #[arg(short, long, env = "SB_METADATA")]
    pub metadata: Option<PathBuf>,

    /// Partner code translation table (JSON).
    #[arg(short, long, env = "SB_TRANSLATIONS")]
    pub translations: Option<PathBuf>,

    /// Key store description (JSON).
    #[arg(short, long, env = "SB_KEYSTORE")]
    pub keystore: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Trust policy inspection.
    #[command(subcommand)]
    Policy(PolicyCommand),

    /// Partner code translation.
    #[command(subcommand)]
    Translate(TranslateCommand),

    /// Run a POST payload through the consumer pipeline.
    Validate(ValidateArgs),
}

/// Policy commands.
#[derive(Debug, Subcommand)]
pub enum PolicyCommand {
    /// Show how responses to a service provider are protected.
    Outbound {
        /// Service provider entity id or partner code.
        sp: String,
    },

    /// Show what is expected from an identity provider.
    Inbound {
        /// Identity provider entity id or partner code.
        idp: String,

        /// Protocol version (overrides SB_CONSUMER_PROTOCOL).
        #[arg(long)]
        protocol: Option<String>,
    },
}

/// Translate commands.
#[derive(Debug, Subcommand)]
pub enum TranslateCommand {
    /// Internal partner code to entity id.
    Code {
        /// Partner code.
        code: String,
    },

    /// Entity id to internal partner code.
    Entity {
        /// Entity id.
        entity_id: String,
    },
}

/// Validate arguments.
#[derive(Debug, clap::Args)]
pub struct ValidateArgs {
    /// Identity provider entity id or partner code.
    #[arg(long)]
    pub idp: String,

    /// File holding the base64 payload.
    pub payload: PathBuf,

    /// Request id the response must answer.
    #[arg(long)]
    pub in_response_to: Option<String>,
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable key/value output.
    #[default]
    Table,
    /// JSON.
    Json,
    /// Nothing on success.
    Quiet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_policy_outbound() {
        let cli = Cli::try_parse_from(["sbctl", "--metadata", "m.json", "policy", "outbound", "sp1"])
            .unwrap();
        assert_eq!(cli.output, OutputFormat::Table);
        assert!(matches!(
            cli.command,
            Command::Policy(PolicyCommand::Outbound { ref sp }) if sp == "sp1"
        ));
    }

    #[test]
    fn parses_validate() {
        let cli = Cli::try_parse_from([
            "sbctl",
            "-m",
            "m.json",
            "-o",
            "json",
            "validate",
            "--idp",
            "idp1",
            "payload.b64",
            "--in-response-to",
            "req-1",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        let Command::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.idp, "idp1");
        assert_eq!(args.in_response_to.as_deref(), Some("req-1"));
    }

    #[test]
    fn translate_requires_a_direction() {
        assert!(Cli::try_parse_from(["sbctl", "-m", "m.json", "translate"]).is_err());
    }
}

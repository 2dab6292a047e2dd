//! # sbctl
//!
//! Command-line entry point.

#![forbid(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use sb_cli::{
    cli::{Cli, Command},
    commands::{run_policy, run_translate, run_validate},
    output::error,
    CliConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CliConfig::load(&cli).context("failed to load configuration")?;

    let result = match cli.command {
        Command::Policy(cmd) => run_policy(cmd, &config, cli.output),
        Command::Translate(cmd) => run_translate(cmd, &config, cli.output),
        Command::Validate(args) => run_validate(args, &config, cli.output),
    };

    if let Err(e) = result {
        error(&e.to_string());
        std::process::exit(1);
    }
    Ok(())
}

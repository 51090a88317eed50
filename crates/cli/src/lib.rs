pub mod commands;

use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use listly_core::config::{AppConfig, LoadOptions, LogFormat};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(
    name = "listly",
    about = "Listly operator console",
    long_about = "Inspect configuration, load the mock directory and exercise the wizard and dialog engine.",
    after_help = "Examples:\n  listly config\n  listly seed\n  listly smoke"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Load the configured fixture dataset and print a JSON summary")]
    Seed,
    #[command(about = "Run the wizard and dialog scenarios with per-check timing details")]
    Smoke,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Commands report config errors themselves; logging just stays off.
    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        init_logging(&config)?;
    }

    let result = match cli.command {
        Command::Seed => commands::seed::run(),
        Command::Smoke => commands::smoke::run(),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    Ok(ExitCode::from(result.exit_code))
}

/// Installs the global subscriber. Events go to stderr so command payloads stay parseable.
pub fn init_logging(config: &AppConfig) -> Result<()> {
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow!("failed to initialize logging: {error}"))
}

//! Donorbase address migration.
//!
//! Converts the free-text `address` on donor records into a structured
//! `addressDetails` value, one record at a time. Safe to re-run: records that
//! already carry a city are never selected again.

mod commands;
mod config;
mod error;

use clap::Parser;
use config::{Cli, Command, DEFAULT_LOG_FILTER};
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let output = match cli.command {
        Command::Parse(args) => commands::parse(args)?,
        Command::Migrate(args) => {
            let store_config = config::store_config_from_env()?;
            commands::migrate(&store_config, args)?
        }
        Command::Import(args) => {
            let store_config = config::store_config_from_env()?;
            commands::import(&store_config, args)?
        }
    };

    println!("{}", output);
    Ok(())
}

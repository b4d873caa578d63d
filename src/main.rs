//! Shuriken CLI - Ninja build file generator
//!
//! Entry point for the shuriken command-line application.

use anyhow::Result;
use clap::Parser;
use tracing::Level;

use shuriken::cli::output::{display_error, OutputConfig};
use shuriken::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.options.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Apply output configuration globally
    let output_config =
        OutputConfig::new(cli.options.quiet, cli.options.json, cli.options.verbose);
    output_config.apply_global();

    // Run the command and handle errors
    match cli.run() {
        Ok(0) => Ok(()),
        Ok(status) => std::process::exit(status),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}

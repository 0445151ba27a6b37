//! Convolvo CLI - WAV Convolution
//!
//! Command-line interface for the Convolvo convolution pipeline.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use convolvo::cli::{commands, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    info!("Convolvo v{}", env!("CARGO_PKG_VERSION"));

    if let Err(err) = commands::convolve_files(&cli) {
        if err.is_recoverable() {
            for hint in err.recovery_suggestions() {
                eprintln!("hint: {}", hint);
            }
        }
        return Err(err).with_context(|| format!("could not produce {}", cli.output.display()));
    }

    Ok(())
}

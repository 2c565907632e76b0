//! `tldw` command-line binary.

mod cli;
mod commands;
mod logging;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::error;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("failed to install rustls crypto provider"))?;

    dotenvy::dotenv().ok();
    logging::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Fetch { reference, output } => commands::fetch(&reference, &output).await,
        Command::Analyze { reference, output } => commands::analyze(&reference, output).await,
        Command::Simulate {
            analysis,
            duration,
            step,
            turbo,
        } => {
            commands::validate_simulation_args(duration, step)?;
            commands::simulate_playback(&analysis, duration, step, turbo).await
        }
    }
}

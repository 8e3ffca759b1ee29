mod api;
mod cli;
mod config;
mod embedding;
mod server;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "veccer", version, about = "Text embedding inference service")]
struct Cli {
    /// Path to the config file (default: ~/.veccer/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the model and serve the HTTP API
    Serve,
    /// Verify configuration and model artifacts without serving
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::VeccerConfig::load_from(path)?,
        None => config::VeccerConfig::load()?,
    };

    // Initialize tracing with the configured log level.
    // Log to stderr so `check` output on stdout stays clean.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            server::serve(config).await?;
        }
        Command::Check => {
            cli::check(&config)?;
        }
    }

    Ok(())
}

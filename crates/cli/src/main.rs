//! Ops tool for the attribute cache.
//!
//! Run with: `cargo run -p stats-cli -- <command>`

mod commands;
mod logging;
mod seed;

use anyhow::Result;
use clap::Parser;
use commands::{Demo, Validate};

/// Attribute cache operations
#[derive(Parser)]
#[command(name = "stats")]
#[command(about = "Validate attribute content and exercise the value cache", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Load a data directory and validate the formula registry against it
    Validate(Validate),

    /// Seed an in-memory world from content and run the cache end to end
    Demo(Demo),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = logging::setup_logging()?;

    let cli = Cli::parse();
    match cli.command {
        Command::Validate(cmd) => cmd.execute(),
        Command::Demo(cmd) => cmd.execute().await,
    }
}

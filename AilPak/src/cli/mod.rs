//! `AilPak` CLI - Command-line interface for AIL archives

pub mod commands;
pub mod progress;

use clap::Parser;
use commands::Commands;

#[derive(Parser)]
#[command(name = "ailpak")]
#[command(version, about = "AilPak: pack and unpack AIL game archives", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Run the `AilPak` CLI
///
/// # Errors
/// Returns the first error raised by the selected command.
pub fn run_cli() -> anyhow::Result<()> {
    // Setup logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    cli.command.execute()?;

    Ok(())
}

//! CLI interface for contrib-truth.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod config;
pub mod output;
pub mod parse;
pub mod verify;

/// contrib-truth: evidence-backed verification of contribution claims.
#[derive(Parser)]
#[command(name = "contrib-truth")]
#[command(
    about = "Verifies contribution claims against commit history and meeting transcripts",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Normalizes evidence files and prints the result.
    Parse(parse::ParseCommand),
    /// Verifies a contribution claim.
    Verify(verify::VerifyCommand),
    /// Configuration information.
    Config(config::ConfigCommand),
}

impl Cli {
    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Parse(cmd) => cmd.execute(),
            Commands::Verify(cmd) => cmd.execute().await,
            Commands::Config(cmd) => cmd.execute(),
        }
    }
}

//! Configuration-related CLI commands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;

use super::output::{render, OutputFormat};
use crate::reasoning::ReasoningConfig;
use crate::utils::Settings;

/// Configuration operations.
#[derive(Parser)]
pub struct ConfigCommand {
    /// Configuration subcommand to execute.
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Shows the resolved AI configuration. API keys are never printed.
    Show(ShowCommand),
}

/// Show command options.
#[derive(Parser)]
pub struct ShowCommand {
    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ConfigView {
    settings_path: String,
    mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ai: Option<ReasoningConfig>,
}

impl ConfigCommand {
    /// Executes the configuration command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            ConfigSubcommands::Show(cmd) => cmd.execute(),
        }
    }
}

impl ShowCommand {
    /// Prints the resolved configuration.
    pub fn execute(self) -> Result<()> {
        let settings_path = Settings::settings_path()?;
        let ai = ReasoningConfig::resolve()?;
        let view = ConfigView {
            settings_path: settings_path.display().to_string(),
            mode: if ai.is_some() { "ai" } else { "heuristic" },
            ai,
        };
        println!("{}", render(&view, self.format)?);
        Ok(())
    }
}

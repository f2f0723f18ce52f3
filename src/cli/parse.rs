//! `parse` commands: normalize evidence files and print the result.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Serialize;

use super::output::{render, OutputFormat};
use crate::git::{read_repository_history, Commit, GitHistory, GitHistoryParser};
use crate::transcript::{SpeakerSummary, Statement, Transcript, TranscriptParser, DEFAULT_TITLE};

/// Evidence parsing operations.
#[derive(Parser)]
pub struct ParseCommand {
    /// Parse subcommand to execute.
    #[command(subcommand)]
    pub command: ParseSubcommands,
}

/// Parse subcommands.
#[derive(Subcommand)]
pub enum ParseSubcommands {
    /// Normalizes a commit log file or a local repository's history.
    History(HistoryCommand),
    /// Normalizes a meeting transcript.
    Transcript(TranscriptCommand),
}

/// History parsing options.
#[derive(Parser)]
pub struct HistoryCommand {
    /// Commit log file (`git log` text, `--oneline` text, or JSON).
    #[arg(value_name = "FILE", required_unless_present = "repo", conflicts_with = "repo")]
    pub file: Option<PathBuf>,

    /// Reads history straight from a local git repository instead.
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Maximum number of commits to read from the repository.
    #[arg(long, value_name = "N", requires = "repo")]
    pub limit: Option<usize>,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

/// Transcript parsing options.
#[derive(Parser)]
pub struct TranscriptCommand {
    /// Transcript text file.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Title for the transcript (defaults to the file name).
    #[arg(long)]
    pub title: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct HistoryView<'a> {
    commit_count: usize,
    contributors: Vec<String>,
    commits: &'a [Commit],
}

impl<'a> HistoryView<'a> {
    fn new(history: &'a GitHistory) -> Self {
        Self {
            commit_count: history.len(),
            contributors: history.contributors(),
            commits: history.commits(),
        }
    }
}

#[derive(Serialize)]
struct TranscriptView<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
    participants: Vec<String>,
    speakers: BTreeMap<String, SpeakerSummary>,
    statements: &'a [Statement],
}

impl<'a> TranscriptView<'a> {
    fn new(transcript: &'a Transcript) -> Self {
        Self {
            title: transcript.title(),
            date: transcript.date(),
            participants: transcript.participants(),
            speakers: transcript.speaker_summary(),
            statements: transcript.statements(),
        }
    }
}

impl ParseCommand {
    /// Executes the parse command.
    pub fn execute(self) -> Result<()> {
        match self.command {
            ParseSubcommands::History(cmd) => cmd.execute(),
            ParseSubcommands::Transcript(cmd) => cmd.execute(),
        }
    }
}

impl HistoryCommand {
    /// Parses the commit log and prints the normalized history.
    pub fn execute(self) -> Result<()> {
        let history = match (&self.repo, &self.file) {
            (Some(repo), _) => read_repository_history(repo, self.limit)?,
            (None, Some(file)) => GitHistoryParser::parse(&read_text(file)?),
            (None, None) => anyhow::bail!("Provide a commit log FILE or --repo DIR"),
        };
        println!("{}", render(&HistoryView::new(&history), self.format)?);
        Ok(())
    }
}

impl TranscriptCommand {
    /// Parses the transcript and prints statements with speaker totals.
    pub fn execute(self) -> Result<()> {
        let content = read_text(&self.file)?;
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| default_title(&self.file));
        let transcript = TranscriptParser::parse(&content, &title);
        println!("{}", render(&TranscriptView::new(&transcript), self.format)?);
        Ok(())
    }
}

/// File name of `path`, or the default transcript title.
pub(crate) fn default_title(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

//! `verify` command: upload evidence files and judge one claim.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use super::output::{render, OutputFormat};
use super::parse::default_title;
use crate::data::EvidenceStore;
use crate::git::read_repository_history;
use crate::reasoning::ReasoningConfig;
use crate::service::{ContributionService, UploadRequest};
use crate::transcript::TranscriptParser;
use crate::verify::ClaimVerifier;

/// Verify command options.
#[derive(Parser)]
pub struct VerifyCommand {
    /// Person making the claim.
    #[arg(long)]
    pub claimant: String,

    /// The contribution being claimed.
    #[arg(long)]
    pub claim: String,

    /// Commit log file (`git log` text, `--oneline` text, or JSON).
    #[arg(long, value_name = "FILE", conflicts_with = "repo")]
    pub git_log: Option<PathBuf>,

    /// Local git repository to read history from.
    #[arg(long, value_name = "DIR")]
    pub repo: Option<PathBuf>,

    /// Maximum number of commits to read from the repository.
    #[arg(long, value_name = "N", requires = "repo")]
    pub limit: Option<usize>,

    /// Meeting transcript file; may be repeated.
    #[arg(long, value_name = "FILE")]
    pub transcript: Vec<PathBuf>,

    /// Skips AI analysis and uses the local heuristic only.
    #[arg(long)]
    pub offline: bool,

    /// Per-request AI timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// AI model override.
    #[arg(long)]
    pub model: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

impl VerifyCommand {
    /// Loads the evidence, verifies the claim and prints the verdict.
    pub async fn execute(self) -> Result<()> {
        let service = ContributionService::new(self.build_verifier()?);

        let summary = if let Some(repo) = &self.repo {
            service.install(self.store_from_repository(repo)?)
        } else {
            service.upload(self.upload_request()?)?
        };
        info!(
            commits = summary.git_commits_parsed,
            statements = summary.transcript_statements_parsed,
            "Evidence loaded"
        );

        let verdict = service.verify(&self.claimant, &self.claim).await?;
        println!("{}", render(&verdict, self.format)?);
        Ok(())
    }

    fn build_verifier(&self) -> Result<ClaimVerifier> {
        if self.offline {
            return Ok(ClaimVerifier::heuristic_only());
        }
        let Some(mut config) = ReasoningConfig::resolve()? else {
            info!("No AI provider configured, using heuristic analysis");
            return Ok(ClaimVerifier::heuristic_only());
        };
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.with_step_timeout_secs(secs);
        }
        Ok(ClaimVerifier::with_reasoning(config.build_disproval_loop()?))
    }

    fn upload_request(&self) -> Result<UploadRequest> {
        let mut request = UploadRequest::new();
        if let Some(path) = &self.git_log {
            request = request.with_history(read_bytes(path)?);
        }
        for path in &self.transcript {
            request = request.with_transcript(Some(default_title(path)), read_bytes(path)?);
        }
        Ok(request)
    }

    fn store_from_repository(&self, repo: &Path) -> Result<EvidenceStore> {
        let history = read_repository_history(repo, self.limit)?;
        let mut transcripts = Vec::with_capacity(self.transcript.len());
        for path in &self.transcript {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read transcript {}", path.display()))?;
            transcripts.push(TranscriptParser::parse(&content, &default_title(path)));
        }
        Ok(EvidenceStore::new(Some(history), transcripts))
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

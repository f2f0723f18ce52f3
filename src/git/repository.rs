//! Reads commit history straight out of a local git repository.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use git2::{Delta, Diff, Oid, Patch, Repository, Sort};
use tracing::debug;

use crate::git::commit::{Commit, FileChange, FileStatus, GitHistory};
use crate::git::parser::UNKNOWN_AUTHOR;

/// Walks history from `HEAD`, newest first, up to `limit` commits.
pub fn read_repository_history<P: AsRef<Path>>(path: P, limit: Option<usize>) -> Result<GitHistory> {
    let path = path.as_ref();
    let repo = Repository::open(path)
        .with_context(|| format!("Failed to open git repository: {}", path.display()))?;

    let mut revwalk = repo.revwalk().context("Failed to create revision walker")?;
    revwalk.push_head().context("Failed to resolve HEAD")?;
    revwalk
        .set_sorting(Sort::TIME)
        .context("Failed to set revision sorting")?;

    let mut commits = Vec::new();
    for oid in revwalk.take(limit.unwrap_or(usize::MAX)) {
        let oid = oid.context("Failed to walk revisions")?;
        commits.push(commit_from_oid(&repo, oid)?);
    }

    debug!(path = %path.display(), commits = commits.len(), "Read repository history");
    Ok(GitHistory::new(commits))
}

fn commit_from_oid(repo: &Repository, oid: Oid) -> Result<Commit> {
    let commit = repo
        .find_commit(oid)
        .with_context(|| format!("Failed to find commit {oid}"))?;

    let author = commit.author();
    let name = author.name().unwrap_or(UNKNOWN_AUTHOR).to_string();
    let email = author.email().map(str::to_string);

    let when = author.when();
    let offset = FixedOffset::east_opt(when.offset_minutes() * 60)
        .or_else(|| FixedOffset::east_opt(0))
        .context("Invalid commit timezone offset")?;
    let timestamp = DateTime::from_timestamp(when.seconds(), 0)
        .context("Invalid commit timestamp")?
        .with_timezone(&offset);

    let message = commit
        .message()
        .unwrap_or("")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let tree = commit.tree().context("Failed to get commit tree")?;
    let parent_tree = if commit.parent_count() > 0 {
        Some(
            commit
                .parent(0)
                .context("Failed to get parent commit")?
                .tree()
                .context("Failed to get parent tree")?,
        )
    } else {
        None
    };
    let diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
        .context("Failed to create diff")?;

    Ok(Commit::new(oid.to_string(), name, email, timestamp, message).with_files(file_changes(&diff)?))
}

fn file_changes(diff: &Diff<'_>) -> Result<Vec<FileChange>> {
    let mut files = Vec::new();
    for (idx, delta) in diff.deltas().enumerate() {
        let status = match delta.status() {
            Delta::Added => FileStatus::Added,
            Delta::Deleted => FileStatus::Deleted,
            Delta::Renamed => FileStatus::Renamed,
            _ => FileStatus::Modified,
        };
        let Some(filename) = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .and_then(Path::to_str)
        else {
            continue;
        };

        let (additions, deletions) = match Patch::from_diff(diff, idx).context("Failed to build patch")? {
            Some(patch) => {
                let (_, added, removed) = patch.line_stats().context("Failed to count lines")?;
                (added as u64, removed as u64)
            }
            None => (0, 0),
        };

        files.push(FileChange {
            filename: filename.to_string(),
            additions,
            deletions,
            status,
        });
    }
    Ok(files)
}

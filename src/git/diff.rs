//! Staged diff snapshot collection.

use std::fmt;

use tracing::{debug, info};

use crate::error::GitError;
use crate::git::repository::RepositoryAccess;

/// Status of a staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "Added"),
            FileStatus::Modified => write!(f, "Modified"),
            FileStatus::Deleted => write!(f, "Deleted"),
            FileStatus::Renamed => write!(f, "Renamed"),
        }
    }
}

/// A file staged for the next commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub path: String,
    pub status: FileStatus,
}

/// Unified diff text of the index against HEAD.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedDiff {
    pub text: String,
    pub additions: usize,
    pub deletions: usize,
}

/// What the working tree looks like right now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoStatus {
    /// Tracked paths with changes that are not staged.
    pub unstaged: Vec<String>,
    pub untracked: usize,
}

/// Everything the prompt needs about the pending commit.
///
/// Captured once per generation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSnapshot {
    pub branch: String,
    pub staged_files: Vec<StagedFile>,
    pub diff_text: String,
    pub additions: usize,
    pub deletions: usize,
    /// Tracked files with unstaged edits that this commit will leave out.
    pub unstaged_count: usize,
    /// New files that are not in the index and will not be committed.
    pub untracked_count: usize,
}

impl DiffSnapshot {
    /// Paths of the staged files, in diff order.
    pub fn file_paths(&self) -> Vec<&str> {
        self.staged_files.iter().map(|f| f.path.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.staged_files.is_empty()
    }
}

/// Read branch, staged file list and staged diff text from the repository.
///
/// Equivalent to `git diff --cached --name-only` plus `git diff --cached`.
/// Read-only; fails with a [`GitError`] when the repository cannot report status.
pub fn collect_snapshot(repo: &dyn RepositoryAccess) -> Result<DiffSnapshot, GitError> {
    let status = repo.status()?;
    let branch = repo.current_branch()?;
    let staged_files = repo.staged_files()?;
    let diff = repo.staged_diff()?;

    if !status.unstaged.is_empty() {
        info!(
            "{} file(s) have unstaged changes that will not be committed",
            status.unstaged.len()
        );
    }

    debug!(
        branch = %branch,
        files = staged_files.len(),
        additions = diff.additions,
        deletions = diff.deletions,
        "collected staged snapshot"
    );

    Ok(DiffSnapshot {
        branch,
        staged_files,
        diff_text: diff.text,
        additions: diff.additions,
        deletions: diff.deletions,
        unstaged_count: status.unstaged.len(),
        untracked_count: status.untracked,
    })
}

//! Repository access: git2 for reads, the system `git` binary for commit and push.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{Delta, Diff, DiffFormat, ErrorCode, Oid, Status, StatusOptions, Tree};
use tracing::debug;

use crate::error::GitError;
use crate::git::diff::{FileStatus, RepoStatus, StagedDiff, StagedFile};

/// The repository operations the pipeline depends on.
///
/// Abstracted so the generation and publish steps can run against fakes.
#[cfg_attr(test, mockall::automock)]
pub trait RepositoryAccess {
    /// Summarize the working tree; fails outside a usable repository.
    fn status(&self) -> Result<RepoStatus, GitError>;

    /// Name of the checked-out branch (also for a branch with no commits yet).
    fn current_branch(&self) -> Result<String, GitError>;

    /// Files staged in the index relative to HEAD (`diff --cached --name-only`).
    fn staged_files(&self) -> Result<Vec<StagedFile>, GitError>;

    /// Unified diff of the index against HEAD (`diff --cached`).
    fn staged_diff(&self) -> Result<StagedDiff, GitError>;

    /// Commit the current index on HEAD with the given message, running the
    /// repository's commit hooks.
    fn commit(&self, message: &str) -> Result<Oid, GitError>;

    /// Push `branch` to `remote`, setting upstream.
    fn push(&self, remote: &str, branch: &str) -> Result<(), GitError>;

    /// URL configured for the named remote.
    fn remote_url(&self, remote: &str) -> Result<String, GitError>;
}

/// [`RepositoryAccess`] backed by a local git repository.
pub struct GitRepository {
    repo: git2::Repository,
    workdir: PathBuf,
}

impl GitRepository {
    /// Open the repository containing `path` (searching parent directories).
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(GitError::OpenRepository)?;
        Ok(Self::from_git2(repo))
    }

    pub fn from_git2(repo: git2::Repository) -> Self {
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| repo.path().to_path_buf());
        Self { repo, workdir }
    }

    pub fn inner(&self) -> &git2::Repository {
        &self.repo
    }

    /// Resolve the HEAD tree, distinguishing an unborn branch from real failures.
    fn head_tree(&self) -> Result<Option<Tree<'_>>, GitError> {
        let head = match self.repo.head() {
            Ok(r) => r,
            Err(e) if is_unborn(&e) => return Ok(None),
            Err(e) => return Err(GitError::NoHead(e)),
        };

        let tree = head.peel_to_tree().map_err(GitError::NoHead)?;
        Ok(Some(tree))
    }

    /// The on-disk index, reloaded if `git add` changed it since it was opened.
    fn fresh_index(&self) -> Result<git2::Index, git2::Error> {
        let mut index = self.repo.index()?;
        index.read(false)?;
        Ok(index)
    }

    fn index_diff(&self) -> Result<Diff<'_>, GitError> {
        let head_tree = self.head_tree()?;
        let index = self.fresh_index().map_err(GitError::Diff)?;
        self.repo
            .diff_tree_to_index(head_tree.as_ref(), Some(&index), None)
            .map_err(GitError::Diff)
    }

    /// Run a git command in the working directory.
    fn run_git(&self, args: &[&str]) -> Result<(), String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| format!("failed to run git: {e}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.is_empty() {
                return Err(format!("git {} exited with {}", args[0], output.status));
            }
            return Err(stderr);
        }

        Ok(())
    }
}

fn is_unborn(e: &git2::Error) -> bool {
    e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound
}

impl RepositoryAccess for GitRepository {
    fn status(&self) -> Result<RepoStatus, GitError> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).recurse_untracked_dirs(false);

        let statuses = self.repo.statuses(Some(&mut opts)).map_err(GitError::Status)?;

        let unstaged_mask = Status::WT_MODIFIED
            | Status::WT_DELETED
            | Status::WT_RENAMED
            | Status::WT_TYPECHANGE;

        let mut status = RepoStatus::default();
        for entry in statuses.iter() {
            let flags = entry.status();
            if flags.intersects(unstaged_mask) {
                if let Some(path) = entry.path() {
                    status.unstaged.push(path.to_string());
                }
            }
            if flags.contains(Status::WT_NEW) {
                status.untracked += 1;
            }
        }

        Ok(status)
    }

    fn current_branch(&self) -> Result<String, GitError> {
        match self.repo.head() {
            Ok(head) => {
                if !head.is_branch() {
                    return Err(GitError::NoHead(git2::Error::from_str(
                        "HEAD is detached; check out a branch first",
                    )));
                }
                head.shorthand().map(str::to_string).ok_or_else(|| {
                    GitError::NoHead(git2::Error::from_str("branch name is not valid UTF-8"))
                })
            }
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                // No commits yet: HEAD is still a symbolic ref to the branch.
                let head = self.repo.find_reference("HEAD").map_err(GitError::NoHead)?;
                head.symbolic_target()
                    .and_then(|target| target.strip_prefix("refs/heads/"))
                    .map(str::to_string)
                    .ok_or(GitError::NoHead(e))
            }
            Err(e) => Err(GitError::NoHead(e)),
        }
    }

    fn staged_files(&self) -> Result<Vec<StagedFile>, GitError> {
        let diff = self.index_diff()?;
        Ok(collect_files_from_diff(&diff))
    }

    fn staged_diff(&self) -> Result<StagedDiff, GitError> {
        let diff = self.index_diff()?;
        collect_diff_text(&diff)
    }

    fn commit(&self, message: &str) -> Result<Oid, GitError> {
        let mut index = self.fresh_index().map_err(GitError::Commit)?;
        let tree_id = index.write_tree().map_err(GitError::Commit)?;
        let tree = self.repo.find_tree(tree_id).map_err(GitError::Commit)?;

        let parent_tree = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit().map_err(GitError::NoHead)?.tree_id()),
            Err(e) if is_unborn(&e) => None,
            Err(e) => return Err(GitError::NoHead(e)),
        };

        let unchanged = match parent_tree {
            Some(parent_tree) => parent_tree == tree_id,
            None => tree.len() == 0,
        };
        if unchanged {
            return Err(GitError::NothingStaged);
        }

        self.repo.signature().map_err(GitError::ConfigError)?;

        // The git binary runs pre-commit/commit-msg hooks and honours commit.gpgsign.
        self.run_git(&["commit", "-q", "-m", message])
            .map_err(GitError::CommitRejected)?;

        let oid = self.repo.refname_to_id("HEAD").map_err(GitError::Commit)?;
        debug!("created commit {oid}");
        Ok(oid)
    }

    fn push(&self, remote: &str, branch: &str) -> Result<(), GitError> {
        self.run_git(&["push", "-u", remote, branch])
            .map_err(GitError::Push)
    }

    fn remote_url(&self, remote: &str) -> Result<String, GitError> {
        let found = self
            .repo
            .find_remote(remote)
            .map_err(|_| GitError::RemoteNotFound(remote.to_string()))?;

        found
            .url()
            .map(str::to_string)
            .ok_or_else(|| GitError::RemoteUrlMissing(remote.to_string()))
    }
}

/// Collect staged file entries from a diff.
fn collect_files_from_diff(diff: &Diff<'_>) -> Vec<StagedFile> {
    diff.deltas()
        .filter_map(|delta| {
            let status = match delta.status() {
                Delta::Added => FileStatus::Added,
                Delta::Deleted => FileStatus::Deleted,
                Delta::Renamed => FileStatus::Renamed,
                _ => FileStatus::Modified,
            };

            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().to_string())?;

            Some(StagedFile { path, status })
        })
        .collect()
}

/// Render a diff as unified patch text with line counts.
fn collect_diff_text(diff: &Diff<'_>) -> Result<StagedDiff, GitError> {
    let mut out = StagedDiff::default();

    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        match origin {
            '+' => out.additions += 1,
            '-' => out.deletions += 1,
            _ => {}
        }

        if origin == '+' || origin == '-' || origin == ' ' {
            out.text.push(origin);
        }

        let content = String::from_utf8_lossy(line.content());
        if let Cow::Owned(_) = content {
            debug!("replaced invalid UTF-8 in diff line");
        }
        out.text.push_str(&content);

        true
    })
    .map_err(GitError::Diff)?;

    Ok(out)
}

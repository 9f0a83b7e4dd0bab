//! Repository identity from a git remote URL.

use std::fmt;

use crate::error::GitHubError;

const HTTPS_PREFIX: &str = "https://github.com/";
const SSH_PREFIX: &str = "git@github.com:";

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIdentity {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Extract owner and repo from a GitHub remote URL.
///
/// Accepts `https://github.com/{owner}/{repo}[.git]` and
/// `git@github.com:{owner}/{repo}[.git]`; anything else is rejected.
pub fn parse_github_remote(url: &str) -> Result<RepoIdentity, GitHubError> {
    let url = url.trim();
    let path = url
        .strip_prefix(HTTPS_PREFIX)
        .or_else(|| url.strip_prefix(SSH_PREFIX))
        .ok_or_else(|| GitHubError::InvalidRepositoryUrl(url.to_string()))?;

    parse_owner_repo_path(path).ok_or_else(|| GitHubError::InvalidRepositoryUrl(url.to_string()))
}

fn parse_owner_repo_path(path: &str) -> Option<RepoIdentity> {
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);

    let mut parts = path.split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    if parts.next().is_some() {
        return None;
    }

    Some(RepoIdentity {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}

//! GitHub token resolution.
//!
//! Checks, in order:
//! 1. `GH_ACCESS_TOKEN`
//! 2. `GITHUB_TOKEN`
//! 3. `GH_TOKEN`
//! 4. `gh auth token` (gh CLI)

use std::env;
use std::process::Command;

use tracing::debug;

use crate::error::GitHubError;

const TOKEN_ENV_VARS: &[&str] = &["GH_ACCESS_TOKEN", "GITHUB_TOKEN", "GH_TOKEN"];

/// Get a GitHub token from the environment or the gh CLI.
pub fn get_github_token() -> Result<String, GitHubError> {
    if let Some(token) = token_from_env() {
        return Ok(token);
    }

    if let Some(token) = token_from_gh_cli() {
        debug!("Using GitHub token from gh CLI");
        return Ok(token);
    }

    Err(GitHubError::AuthenticationFailed)
}

fn token_from_env() -> Option<String> {
    TOKEN_ENV_VARS.iter().find_map(|name| {
        env::var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .inspect(|_| debug!("Using GitHub token from {name}"))
    })
}

/// Try to get a token from the gh CLI.
fn token_from_gh_cli() -> Option<String> {
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;

    if !output.status.success() {
        return None;
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!token.is_empty()).then_some(token)
}

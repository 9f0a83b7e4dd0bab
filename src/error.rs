//! Error types for git-ai-commit modules using thiserror.

use thiserror::Error;

/// Errors from repository operations (repository-state errors).
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Repository has no readable HEAD: {0}")]
    NoHead(#[source] git2::Error),

    #[error("Failed to read repository status: {0}")]
    Status(#[source] git2::Error),

    #[error("Failed to collect staged diff: {0}")]
    Diff(#[source] git2::Error),

    #[error("No staged changes to commit")]
    NothingStaged,

    #[error("Failed to create commit: {0}")]
    Commit(#[source] git2::Error),

    #[error("git commit failed: {0}")]
    CommitRejected(String),

    #[error("Git config error (missing user.name or user.email): {0}")]
    ConfigError(#[source] git2::Error),

    #[error("git push failed: {0}")]
    Push(String),

    #[error("Remote '{0}' not found")]
    RemoteNotFound(String),

    #[error("Remote '{0}' has no URL")]
    RemoteUrlMissing(String),
}

/// Errors from the language-model client.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Model API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Model returned no text output")]
    EmptyResponse,

    #[error("Model returned an unreadable response: {0}")]
    InvalidResponse(String),
}

/// Errors from GitHub API operations.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error(
        "GitHub authentication failed: no valid auth found. Set GH_ACCESS_TOKEN or GITHUB_TOKEN, or run 'gh auth login'"
    )]
    AuthenticationFailed,

    #[error("GitHub API request failed: {0}")]
    Client(#[source] Box<octocrab::Error>),

    #[error("No commits between {base} and {head}")]
    NoCommitsBetween { head: String, base: String },

    #[error("Not a GitHub remote URL: {0}")]
    InvalidRepositoryUrl(String),
}

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set. Export it or add it to a .env file")]
    MissingGeminiKey,
}

/// Errors from the publish pipeline, labelled by the stage that failed.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Could not generate a commit message")]
    Generation,

    #[error("Commit failed: {0}")]
    Commit(#[source] GitError),

    #[error("Push failed: {0}")]
    Push(#[source] GitError),

    #[error("Could not resolve GitHub repository: {0}")]
    RepoIdentity(String),

    #[error("Pull request update failed: {0}")]
    PullRequest(#[source] GitHubError),
}

impl PublishError {
    /// Short stage label used in logs and user-facing reports.
    pub fn stage(&self) -> &'static str {
        match self {
            PublishError::Generation => "generation",
            PublishError::Commit(_) => "commit",
            PublishError::Push(_) => "push",
            PublishError::RepoIdentity(_) => "repo-identity",
            PublishError::PullRequest(_) => "pr",
        }
    }

    /// Whether the failure prevents the commit from landing on the remote.
    ///
    /// Repo-identity and PR failures happen after a successful push, so they
    /// only cost the PR annotation.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PublishError::Generation | PublishError::Commit(_) | PublishError::Push(_)
        )
    }
}

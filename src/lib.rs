//! git-ai-commit - Turn staged changes into a conventional commit and pull request.
//!
//! # Overview
//!
//! git-ai-commit reads the staged diff, asks Gemini for a conventional commit
//! title and body, commits and pushes it, and can then open a pull request or
//! append the new change lines to the one already open for the branch.

pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod llm;
pub mod publish;

// Re-export commonly used types
pub use commit::{CommitGenerator, CommitRecord, GenerationReport};
pub use config::Config;
pub use error::{ConfigError, GitError, GitHubError, ModelError, PublishError};
pub use git::{DiffSnapshot, GitRepository, RepositoryAccess};
pub use github::{HostingClient, OctocrabClient, ReconcileOutcome};
pub use llm::{GeminiClient, ModelClient};
pub use publish::{PrStatus, PublishReport, PublishState, Publisher};

//! Git operations using git2-rs.

pub mod diff;
pub mod repository;

pub use diff::{DiffSnapshot, FileStatus, RepoStatus, StagedDiff, StagedFile, collect_snapshot};
pub use repository::{GitRepository, RepositoryAccess};

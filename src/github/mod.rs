//! GitHub access: token resolution, remote parsing and pull requests.

pub mod auth;
pub mod prs;
pub mod remote;

pub use auth::get_github_token;
pub use prs::{
    HostingClient, NewPullRequest, OctocrabClient, PullRequest, PullRequestTarget, ReconcileOutcome,
    reconcile_pull_request,
};
pub use remote::{RepoIdentity, parse_github_remote};

//! Publish pipeline: commit the generated record, push, then reconcile the PR.
//!
//! Generation, commit and push failures abort the run. Once the push has
//! landed, failures resolving the GitHub repository or reconciling the pull
//! request are reported on the [`PublishReport`] instead; nothing is rolled back.

use std::fmt;

use git2::Oid;
use tracing::{debug, info, warn};

use crate::commit::CommitRecord;
use crate::config::{DEFAULT_BASE_BRANCH, DEFAULT_REMOTE};
use crate::error::PublishError;
use crate::git::RepositoryAccess;
use crate::github::{HostingClient, PullRequestTarget, ReconcileOutcome, parse_github_remote};

/// Where to push and which branch a pull request targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOptions {
    pub remote: String,
    pub base: String,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
            base: DEFAULT_BASE_BRANCH.to_string(),
        }
    }
}

/// Pipeline states, in the order a successful run visits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    Generating,
    Committing,
    Pushing,
    ResolvingRepoIdentity,
    ReconcilingPr,
    Done,
    /// Terminal failure, labelled with the stage that failed.
    Failed(&'static str),
}

impl fmt::Display for PublishState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishState::Generating => write!(f, "generating"),
            PublishState::Committing => write!(f, "committing"),
            PublishState::Pushing => write!(f, "pushing"),
            PublishState::ResolvingRepoIdentity => write!(f, "resolving repository"),
            PublishState::ReconcilingPr => write!(f, "reconciling pull request"),
            PublishState::Done => write!(f, "done"),
            PublishState::Failed(stage) => write!(f, "failed ({stage})"),
        }
    }
}

/// How the pull request step ended.
#[derive(Debug)]
pub enum PrStatus {
    NotRequested,
    Reconciled(ReconcileOutcome),
    /// The commit is pushed but the PR step could not complete.
    Failed(PublishError),
}

/// Outcome of a publish run that got the commit onto the remote.
#[derive(Debug)]
pub struct PublishReport {
    pub commit: Oid,
    pub pull_request: PrStatus,
    /// Every state the run passed through, ending in `Done` or a PR-step `Failed`.
    pub states: Vec<PublishState>,
}

impl PublishReport {
    pub fn final_state(&self) -> Option<PublishState> {
        self.states.last().copied()
    }
}

/// Commits, pushes and optionally opens or updates a pull request.
///
/// A pull request is only attempted when a hosting client is supplied.
pub struct Publisher<'a> {
    repo: &'a dyn RepositoryAccess,
    hosting: Option<&'a dyn HostingClient>,
    options: PublishOptions,
}

impl<'a> Publisher<'a> {
    pub fn new(
        repo: &'a dyn RepositoryAccess,
        hosting: Option<&'a dyn HostingClient>,
        options: PublishOptions,
    ) -> Self {
        Self {
            repo,
            hosting,
            options,
        }
    }

    /// Run the pipeline for `record` on `branch`.
    ///
    /// A missing record fails in the generation stage before any repository
    /// mutation.
    pub async fn publish(
        &self,
        record: Option<&CommitRecord>,
        branch: &str,
    ) -> Result<PublishReport, PublishError> {
        let mut states = vec![PublishState::Generating];

        let Some(record) = record else {
            return Err(fail(&mut states, PublishError::Generation));
        };

        enter(&mut states, PublishState::Committing);
        let commit = match self.repo.commit(&record.title) {
            Ok(oid) => oid,
            Err(e) => return Err(fail(&mut states, PublishError::Commit(e))),
        };
        info!("Committed {} \"{}\"", short_id(commit), record.title);

        enter(&mut states, PublishState::Pushing);
        if let Err(e) = self.repo.push(&self.options.remote, branch) {
            return Err(fail(&mut states, PublishError::Push(e)));
        }
        info!("Pushed {branch} to {}", self.options.remote);

        let Some(hosting) = self.hosting else {
            enter(&mut states, PublishState::Done);
            return Ok(PublishReport {
                commit,
                pull_request: PrStatus::NotRequested,
                states,
            });
        };

        let pull_request = match self.pull_request(hosting, record, branch, &mut states).await {
            Ok(outcome) => {
                enter(&mut states, PublishState::Done);
                PrStatus::Reconciled(outcome)
            }
            Err(e) => PrStatus::Failed(fail(&mut states, e)),
        };

        Ok(PublishReport {
            commit,
            pull_request,
            states,
        })
    }

    async fn pull_request(
        &self,
        hosting: &dyn HostingClient,
        record: &CommitRecord,
        branch: &str,
        states: &mut Vec<PublishState>,
    ) -> Result<ReconcileOutcome, PublishError> {
        enter(states, PublishState::ResolvingRepoIdentity);
        let url = self
            .repo
            .remote_url(&self.options.remote)
            .map_err(|e| PublishError::RepoIdentity(e.to_string()))?;
        let identity =
            parse_github_remote(&url).map_err(|e| PublishError::RepoIdentity(e.to_string()))?;
        debug!("Resolved {} to {identity}", self.options.remote);

        enter(states, PublishState::ReconcilingPr);
        let target = PullRequestTarget {
            owner: identity.owner,
            repo: identity.repo,
            head: branch.to_string(),
            base: self.options.base.clone(),
        };

        crate::github::reconcile_pull_request(hosting, &target, record)
            .await
            .map_err(PublishError::PullRequest)
    }
}

fn enter(states: &mut Vec<PublishState>, next: PublishState) {
    if let Some(prev) = states.last() {
        debug!("Publish: {prev} -> {next}");
    }
    states.push(next);
}

fn fail(states: &mut Vec<PublishState>, error: PublishError) -> PublishError {
    if error.is_fatal() {
        warn!("Publish aborted in {} stage: {error}", error.stage());
    } else {
        warn!("Commit pushed, but the {} step failed: {error}", error.stage());
    }
    enter(states, PublishState::Failed(error.stage()));
    error
}

fn short_id(oid: Oid) -> String {
    oid.to_string().chars().take(7).collect()
}

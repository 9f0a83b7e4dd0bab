//! Pull request access via octocrab, and create-or-update reconciliation.
//!
//! Reconciliation is a plain list-then-act sequence: GitHub offers no
//! transaction around it, so two concurrent runs on the same branch can still
//! race into duplicate pull requests or interleaved body updates.

use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::{debug, info, warn};

use crate::commit::CommitRecord;
use crate::error::GitHubError;

/// A GitHub pull request, reduced to what the pipeline uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub html_url: Option<String>,
}

/// Fields for opening a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

/// Where a pull request should live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestTarget {
    pub owner: String,
    pub repo: String,
    pub head: String,
    pub base: String,
}

impl PullRequestTarget {
    /// `owner:branch`, the form GitHub's `head` filter expects.
    pub fn head_filter(&self) -> String {
        format!("{}:{}", self.owner, self.head)
    }

    /// Browsable URL of the head branch.
    pub fn branch_url(&self) -> String {
        format!(
            "https://github.com/{}/{}/tree/{}",
            self.owner, self.repo, self.head
        )
    }
}

/// What reconciliation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created(PullRequest),
    Updated(PullRequest),
    /// GitHub reported no commits between head and base; nothing to open.
    NothingToMerge { branch_url: String, message: String },
}

impl ReconcileOutcome {
    /// The URL worth showing the user.
    pub fn url(&self) -> Option<&str> {
        match self {
            ReconcileOutcome::Created(pr) | ReconcileOutcome::Updated(pr) => pr.html_url.as_deref(),
            ReconcileOutcome::NothingToMerge { branch_url, .. } => Some(branch_url),
        }
    }
}

/// The code-hosting operations reconciliation needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HostingClient: Send + Sync {
    /// Open pull requests whose head matches `head_filter` (`owner:branch`).
    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        head_filter: &str,
    ) -> Result<Vec<PullRequest>, GitHubError>;

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &NewPullRequest,
    ) -> Result<PullRequest, GitHubError>;

    /// Replace the body of an existing pull request. The title is left alone.
    async fn update_pull_request_body(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<PullRequest, GitHubError>;
}

/// [`HostingClient`] backed by octocrab.
pub struct OctocrabClient {
    octocrab: Octocrab,
}

impl OctocrabClient {
    /// Build a client authenticated with a personal access token.
    pub fn with_token(token: &str) -> Result<Self, GitHubError> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .map_err(|e| GitHubError::Client(Box::new(e)))?;
        Ok(Self { octocrab })
    }

    /// Use a pre-configured octocrab client (e.g. pointed at a mock server).
    pub fn with_client(octocrab: Octocrab) -> Self {
        Self { octocrab }
    }
}

fn from_model(pr: octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        title: pr.title.unwrap_or_default(),
        body: pr.body,
        html_url: pr.html_url.map(|u| u.to_string()),
    }
}

/// Classify an octocrab failure from creating a pull request.
///
/// Checks both Display and Debug output since the "no commits" detail sits
/// in the validation `errors` array rather than the top-level message.
fn classify_create_error(e: octocrab::Error, head: &str, base: &str) -> GitHubError {
    let display = e.to_string().to_lowercase();
    let debug = format!("{e:?}").to_lowercase();

    if display.contains("no commits between") || debug.contains("no commits between") {
        return GitHubError::NoCommitsBetween {
            head: head.to_string(),
            base: base.to_string(),
        };
    }

    GitHubError::Client(Box::new(e))
}

#[async_trait]
impl HostingClient for OctocrabClient {
    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        head_filter: &str,
    ) -> Result<Vec<PullRequest>, GitHubError> {
        let page = self
            .octocrab
            .pulls(owner, repo)
            .list()
            .state(octocrab::params::State::Open)
            .head(head_filter)
            .per_page(100)
            .send()
            .await
            .map_err(|e| GitHubError::Client(Box::new(e)))?;

        Ok(page.items.into_iter().map(from_model).collect())
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr: &NewPullRequest,
    ) -> Result<PullRequest, GitHubError> {
        self.octocrab
            .pulls(owner, repo)
            .create(pr.title.as_str(), pr.head.as_str(), pr.base.as_str())
            .body(pr.body.as_str())
            .send()
            .await
            .map(from_model)
            .map_err(|e| classify_create_error(e, &pr.head, &pr.base))
    }

    async fn update_pull_request_body(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> Result<PullRequest, GitHubError> {
        self.octocrab
            .pulls(owner, repo)
            .update(number)
            .body(body)
            .send()
            .await
            .map(from_model)
            .map_err(|e| GitHubError::Client(Box::new(e)))
    }
}

/// Body for a newly created pull request.
pub fn pull_request_body(record: &CommitRecord) -> String {
    format!("## Summary\n\n### Changes\n{}", record.body_text())
}

/// Append new change lines beneath an existing body.
pub fn append_body(existing: Option<&str>, addition: &str) -> String {
    match existing.map(str::trim_end) {
        Some(current) if !current.is_empty() => format!("{current}\n{addition}"),
        _ => addition.to_string(),
    }
}

/// Create the pull request for `target`, or extend the one that already exists.
///
/// An existing open PR for the head keeps its title; the record's body lines
/// are appended to its body so repeated runs accumulate a changelog.
pub async fn reconcile_pull_request<H: HostingClient + ?Sized>(
    client: &H,
    target: &PullRequestTarget,
    record: &CommitRecord,
) -> Result<ReconcileOutcome, GitHubError> {
    let existing = client
        .list_pull_requests(&target.owner, &target.repo, &target.head_filter())
        .await?;

    if existing.len() > 1 {
        warn!(
            "{} open pull requests for {}; updating the first",
            existing.len(),
            target.head_filter()
        );
    }

    if let Some(pr) = existing.into_iter().next() {
        if record.body.is_empty() {
            debug!("No body lines to append to PR #{}", pr.number);
            return Ok(ReconcileOutcome::Updated(pr));
        }

        let body = append_body(pr.body.as_deref(), &record.body_text());
        info!("Appending changes to existing PR #{}", pr.number);
        let updated = client
            .update_pull_request_body(&target.owner, &target.repo, pr.number, &body)
            .await?;
        return Ok(ReconcileOutcome::Updated(updated));
    }

    let new_pr = NewPullRequest {
        title: record.title.clone(),
        body: pull_request_body(record),
        head: target.head.clone(),
        base: target.base.clone(),
    };

    match client
        .create_pull_request(&target.owner, &target.repo, &new_pr)
        .await
    {
        Ok(pr) => {
            info!("Created PR #{}", pr.number);
            Ok(ReconcileOutcome::Created(pr))
        }
        Err(GitHubError::NoCommitsBetween { head, base }) => {
            info!("No commits between {base} and {head}; not opening a PR");
            Ok(ReconcileOutcome::NothingToMerge {
                branch_url: target.branch_url(),
                message: format!(
                    "Branch '{head}' has no commits beyond '{base}', so there is nothing to open a pull request for"
                ),
            })
        }
        Err(e) => Err(e),
    }
}

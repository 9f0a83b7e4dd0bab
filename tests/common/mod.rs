//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::Path;

use git2::{Oid, Repository, Signature};
use octocrab::Octocrab;
use serde_json::{Map, Value, json};
use wiremock::MockServer;

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository with a committer identity configured.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config.set_str("user.name", "Test User").expect("Failed to set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set user.email");
        }
        Self { dir, repo }
    }

    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file in the working tree without staging it.
    pub fn write(&self, name: &str, content: &str) {
        let file_path = self.dir.path().join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    /// Add a path to the index.
    pub fn stage(&self, name: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write and stage a file.
    pub fn stage_file(&self, name: &str, content: &str) {
        self.write(name, content);
        self.stage(name);
    }

    /// Commit whatever is staged. Returns the commit OID.
    pub fn commit_staged(&self, message: &str) -> Oid {
        let sig = self.signature();
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create a branch at HEAD and check it out.
    pub fn checkout_new_branch(&self, name: &str) {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to resolve HEAD");
        self.repo.branch(name, &head, false).expect("Failed to create branch");
        self.repo
            .set_head(&format!("refs/heads/{name}"))
            .expect("Failed to set HEAD");
    }

    /// Add a remote whose fetch URL looks like GitHub but pushes to `push_url`.
    pub fn add_remote(&self, name: &str, url: &str, push_url: &Path) {
        self.repo.remote(name, url).expect("Failed to add remote");
        self.repo
            .remote_set_pushurl(name, Some(&push_url.to_string_lossy()))
            .expect("Failed to set push URL");
    }

    /// Install an executable hook script under `.git/hooks`.
    #[cfg(unix)]
    pub fn install_hook(&self, name: &str, script: &str) {
        use std::os::unix::fs::PermissionsExt;

        let hooks = self.repo.path().join("hooks");
        std::fs::create_dir_all(&hooks).expect("Failed to create hooks dir");
        let hook = hooks.join(name);
        std::fs::write(&hook, script).expect("Failed to write hook");
        std::fs::set_permissions(&hook, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make hook executable");
    }

    pub fn head_message(&self) -> String {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map(|c| c.summary().unwrap_or_default().to_string())
            .expect("Failed to read HEAD commit")
    }
}

/// Create a bare repository to act as a push target.
pub fn bare_remote() -> (tempfile::TempDir, Repository) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let repo = Repository::init_bare(dir.path()).expect("Failed to init bare repo");
    (dir, repo)
}

/// Helper to create an octocrab client pointing to a mock server.
pub async fn mock_octocrab(server: &MockServer) -> Octocrab {
    Octocrab::builder()
        .base_uri(server.uri())
        .expect("Failed to set base URI")
        .build()
        .expect("Failed to build octocrab")
}

/// Create a mock user object with the fields octocrab requires.
pub fn mock_user(login: &str, id: u64) -> Value {
    let mut user = Map::new();
    user.insert("login".into(), json!(login));
    user.insert("id".into(), json!(id));
    user.insert("node_id".into(), json!(format!("MDQ6VXNlcnt{id}")));
    user.insert(
        "avatar_url".into(),
        json!(format!("https://avatars.githubusercontent.com/u/{id}?v=4")),
    );
    user.insert("gravatar_id".into(), json!(""));
    user.insert("url".into(), json!(format!("https://api.github.com/users/{login}")));
    user.insert("html_url".into(), json!(format!("https://github.com/{login}")));
    for (key, suffix) in [
        ("followers_url", "followers"),
        ("following_url", "following{/other_user}"),
        ("gists_url", "gists{/gist_id}"),
        ("starred_url", "starred{/owner}{/repo}"),
        ("subscriptions_url", "subscriptions"),
        ("organizations_url", "orgs"),
        ("repos_url", "repos"),
        ("events_url", "events{/privacy}"),
        ("received_events_url", "received_events"),
    ] {
        user.insert(
            key.into(),
            json!(format!("https://api.github.com/users/{login}/{suffix}")),
        );
    }
    user.insert("type".into(), json!("User"));
    user.insert("site_admin".into(), json!(false));
    Value::Object(user)
}

/// Create a mock repository object for `acme/widgets`.
pub fn mock_repo() -> Value {
    let api = "https://api.github.com/repos/acme/widgets";
    let mut repo = Map::new();
    repo.insert("id".into(), json!(1));
    repo.insert("node_id".into(), json!("MDEwOlJlcG9zaXRvcnkx"));
    repo.insert("name".into(), json!("widgets"));
    repo.insert("full_name".into(), json!("acme/widgets"));
    repo.insert("owner".into(), mock_user("acme", 1));
    repo.insert("private".into(), json!(false));
    repo.insert("html_url".into(), json!("https://github.com/acme/widgets"));
    repo.insert("description".into(), json!("Test repository"));
    repo.insert("fork".into(), json!(false));
    repo.insert("url".into(), json!(api));
    for (key, suffix) in [
        ("forks_url", "forks"),
        ("keys_url", "keys{/key_id}"),
        ("collaborators_url", "collaborators{/collaborator}"),
        ("teams_url", "teams"),
        ("hooks_url", "hooks"),
        ("issue_events_url", "issues/events{/number}"),
        ("events_url", "events"),
        ("assignees_url", "assignees{/user}"),
        ("branches_url", "branches{/branch}"),
        ("tags_url", "tags"),
        ("blobs_url", "git/blobs{/sha}"),
        ("git_tags_url", "git/tags{/sha}"),
        ("git_refs_url", "git/refs{/sha}"),
        ("trees_url", "git/trees{/sha}"),
        ("statuses_url", "statuses/{sha}"),
        ("languages_url", "languages"),
        ("stargazers_url", "stargazers"),
        ("contributors_url", "contributors"),
        ("subscribers_url", "subscribers"),
        ("subscription_url", "subscription"),
        ("commits_url", "commits{/sha}"),
        ("git_commits_url", "git/commits{/sha}"),
        ("comments_url", "comments{/number}"),
        ("issue_comment_url", "issues/comments{/number}"),
        ("contents_url", "contents/{+path}"),
        ("compare_url", "compare/{base}...{head}"),
        ("merges_url", "merges"),
        ("archive_url", "{archive_format}{/ref}"),
        ("downloads_url", "downloads"),
        ("issues_url", "issues{/number}"),
        ("pulls_url", "pulls{/number}"),
        ("milestones_url", "milestones{/number}"),
        ("notifications_url", "notifications{?since,all,participating}"),
        ("labels_url", "labels{/name}"),
        ("releases_url", "releases{/id}"),
        ("deployments_url", "deployments"),
    ] {
        repo.insert(key.into(), json!(format!("{api}/{suffix}")));
    }
    Value::Object(repo)
}

/// Create an open PR JSON object for `acme/widgets` that octocrab can decode.
pub fn mock_pr(number: u64, title: &str, body: Option<&str>, head: &str) -> Value {
    let repo = mock_repo();
    let user = mock_user("acme", 1);
    let api = "https://api.github.com/repos/acme/widgets";

    let head = json!({
        "label": format!("acme:{head}"),
        "ref": head,
        "sha": "abc123def456789",
        "user": user.clone(),
        "repo": repo.clone()
    });

    let base = json!({
        "label": "acme:main",
        "ref": "main",
        "sha": "def456abc789",
        "user": user.clone(),
        "repo": repo
    });

    let links = json!({
        "self": { "href": format!("{api}/pulls/{number}") },
        "html": { "href": format!("https://github.com/acme/widgets/pull/{number}") },
        "issue": { "href": format!("{api}/issues/{number}") },
        "comments": { "href": format!("{api}/issues/{number}/comments") },
        "review_comments": { "href": format!("{api}/pulls/{number}/comments") },
        "review_comment": { "href": format!("{api}/pulls/comments{{/number}}") },
        "commits": { "href": format!("{api}/pulls/{number}/commits") },
        "statuses": { "href": format!("{api}/statuses/abc123def456789") }
    });

    // Built with a Map to stay clear of json! recursion limits
    let mut pr = Map::new();
    pr.insert("url".into(), json!(format!("{api}/pulls/{number}")));
    pr.insert("id".into(), json!(number * 1000));
    pr.insert("node_id".into(), json!(format!("PR_{number}")));
    pr.insert(
        "html_url".into(),
        json!(format!("https://github.com/acme/widgets/pull/{number}")),
    );
    pr.insert(
        "diff_url".into(),
        json!(format!("https://github.com/acme/widgets/pull/{number}.diff")),
    );
    pr.insert(
        "patch_url".into(),
        json!(format!("https://github.com/acme/widgets/pull/{number}.patch")),
    );
    pr.insert("issue_url".into(), json!(format!("{api}/issues/{number}")));
    pr.insert("commits_url".into(), json!(format!("{api}/pulls/{number}/commits")));
    pr.insert(
        "review_comments_url".into(),
        json!(format!("{api}/pulls/{number}/comments")),
    );
    pr.insert(
        "review_comment_url".into(),
        json!(format!("{api}/pulls/comments{{/number}}")),
    );
    pr.insert(
        "comments_url".into(),
        json!(format!("{api}/issues/{number}/comments")),
    );
    pr.insert("statuses_url".into(), json!(format!("{api}/statuses/abc123")));
    pr.insert("number".into(), json!(number));
    pr.insert("state".into(), json!("open"));
    pr.insert("locked".into(), json!(false));
    pr.insert("title".into(), json!(title));
    pr.insert("body".into(), json!(body));
    pr.insert("user".into(), user);
    pr.insert("labels".into(), json!([]));
    pr.insert("assignee".into(), Value::Null);
    pr.insert("assignees".into(), json!([]));
    pr.insert("requested_reviewers".into(), json!([]));
    pr.insert("requested_teams".into(), json!([]));
    pr.insert("milestone".into(), Value::Null);
    pr.insert("created_at".into(), json!("2024-01-01T00:00:00Z"));
    pr.insert("updated_at".into(), json!("2024-01-15T00:00:00Z"));
    pr.insert("closed_at".into(), Value::Null);
    pr.insert("merged_at".into(), Value::Null);
    pr.insert("merge_commit_sha".into(), Value::Null);
    pr.insert("head".into(), head);
    pr.insert("base".into(), base);
    pr.insert("draft".into(), json!(false));
    pr.insert("merged".into(), json!(false));
    pr.insert("mergeable".into(), json!(true));
    pr.insert("mergeable_state".into(), json!("clean"));
    pr.insert("merged_by".into(), Value::Null);
    pr.insert("comments".into(), json!(0));
    pr.insert("review_comments".into(), json!(0));
    pr.insert("maintainer_can_modify".into(), json!(true));
    pr.insert("commits".into(), json!(1));
    pr.insert("additions".into(), json!(10));
    pr.insert("deletions".into(), json!(2));
    pr.insert("changed_files".into(), json!(1));
    pr.insert("_links".into(), links);

    Value::Object(pr)
}

/// GitHub's 422 body for a pull request with nothing to merge.
pub fn no_commits_error(head: &str, base: &str) -> Value {
    json!({
        "message": "Validation Failed",
        "errors": [{
            "resource": "PullRequest",
            "code": "custom",
            "message": format!("No commits between {base} and {head}")
        }],
        "documentation_url": "https://docs.github.com/rest/pulls/pulls#create-a-pull-request"
    })
}

/// A Gemini `generateContent` response carrying `text`.
pub fn gemini_response(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

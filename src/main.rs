//! git-ai-commit - CLI entry point.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use git_ai_commit::commit::{CommitGenerator, CommitRecord};
use git_ai_commit::config::Config;
use git_ai_commit::git::{GitRepository, collect_snapshot};
use git_ai_commit::github::{HostingClient, OctocrabClient, ReconcileOutcome, get_github_token};
use git_ai_commit::llm::GeminiClient;
use git_ai_commit::publish::{PrStatus, PublishOptions, Publisher};

/// Turn staged changes into a conventional commit, and optionally a pull request.
#[derive(Parser, Debug)]
#[command(name = "git-ai-commit")]
#[command(about = "Generate a conventional commit from staged changes using Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Gemini model to use (overrides GIT_AI_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Base branch for pull requests (overrides GIT_AI_BASE_BRANCH)
    #[arg(long, global = true)]
    base: Option<String>,

    /// Remote to push to (overrides GIT_AI_REMOTE)
    #[arg(long, global = true)]
    remote: Option<String>,

    /// Generate and print the commit message without committing or pushing
    #[arg(long, global = true)]
    dry_run: bool,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Commit staged changes with a generated message and push
    Commit {
        /// Also create or update a pull request for the branch
        #[arg(long)]
        pr: bool,
    },
    /// Shorthand for `commit --pr`
    CommitPr,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("warn,git_ai_commit=debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let create_pr = match cli.command {
        Command::Commit { pr } => pr,
        Command::CommitPr => true,
    };

    let mut config = Config::from_env()?;
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(base) = cli.base {
        config.base_branch = base;
    }
    if let Some(remote) = cli.remote {
        config.remote = remote;
    }

    // Resolve GitHub access before anything touches the repository.
    let hosting = if create_pr && !cli.dry_run {
        let token = get_github_token()?;
        Some(OctocrabClient::with_token(&token).context("Failed to build GitHub client")?)
    } else {
        None
    };

    let repo = GitRepository::discover(".")
        .context("Not a git repository. Run git-ai-commit from within a git repository.")?;

    let snapshot = collect_snapshot(&repo).context("Failed to read staged changes")?;
    if snapshot.is_empty() {
        bail!("No staged changes. Stage files with `git add` first.");
    }
    if snapshot.unstaged_count > 0 {
        eprintln!(
            "Note: {} file(s) with unstaged changes will not be included",
            snapshot.unstaged_count
        );
    }
    if snapshot.untracked_count > 0 {
        eprintln!(
            "Note: {} untracked file(s) will not be included",
            snapshot.untracked_count
        );
    }

    let model = GeminiClient::with_base_url(
        config.gemini_api_key.as_str(),
        config.model.as_str(),
        config.api_base.as_str(),
    );
    println!(
        "Generating commit message with {} for {} file(s) on {} (+{} -{})...",
        model.model(),
        snapshot.staged_files.len(),
        snapshot.branch,
        snapshot.additions,
        snapshot.deletions
    );
    let report = CommitGenerator::new(&model).generate(&snapshot).await;
    let calls = report.model_calls();

    let Some(record) = report.record else {
        bail!("Could not generate a commit message after {calls} model call(s). Nothing was committed.");
    };

    print_record(&record);

    if cli.dry_run {
        println!("\nDry run: nothing committed.");
        return Ok(());
    }

    let options = PublishOptions {
        remote: config.remote,
        base: config.base_branch,
    };
    let publisher = Publisher::new(
        &repo,
        hosting.as_ref().map(|c| c as &dyn HostingClient),
        options,
    );

    let published = publisher
        .publish(Some(&record), &snapshot.branch)
        .await
        .context("Publishing the commit failed")?;

    println!("\nCommitted {} and pushed {}", published.commit, snapshot.branch);

    match published.pull_request {
        PrStatus::NotRequested => {}
        PrStatus::Reconciled(ReconcileOutcome::Created(pr)) => {
            println!("Created PR #{}: {}", pr.number, pr.html_url.unwrap_or_default());
        }
        PrStatus::Reconciled(ReconcileOutcome::Updated(pr)) => {
            println!("Updated PR #{}: {}", pr.number, pr.html_url.unwrap_or_default());
        }
        PrStatus::Reconciled(ReconcileOutcome::NothingToMerge { branch_url, message }) => {
            println!("{message}");
            println!("Branch: {branch_url}");
        }
        PrStatus::Failed(e) => {
            eprintln!("Warning: commit was pushed, but the {} step failed: {e}", e.stage());
        }
    }

    Ok(())
}

fn print_record(record: &CommitRecord) {
    println!("\n{}", record.title);
    if !record.body.is_empty() {
        println!();
        for line in &record.body {
            println!("{line}");
        }
    }
}

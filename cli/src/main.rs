//! CLI for the Jira linker.
//!
//! Finds Jira issue keys in the current change, resolves them against Jira
//! and links the resolved issues back to GitHub.

use clap::{Parser, ValueEnum};
use jira_linker::{
    FixVersionMode, FixVersionOverride, JiraArgs, KeyPattern, RunSummary, Runner, RunnerConfig,
    RunnerError, TransitionTriggers,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Jira Linker - Link Jira issues mentioned in commits, branches and pull requests.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Jira base URL, e.g. https://example.atlassian.net
    #[arg(long, env = "JIRA_BASE_URL")]
    jira_base_url: Option<String>,

    /// Jira user email.
    #[arg(long, env = "JIRA_USER_EMAIL")]
    jira_user_email: Option<String>,

    /// Jira API token.
    #[arg(long, env = "JIRA_API_TOKEN", hide_env_values = true)]
    jira_api_token: Option<String>,

    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Text to scan for issue keys.
    #[arg(long)]
    string: Option<String>,

    /// Pull request title to scan instead of the event's.
    #[arg(long)]
    title: Option<String>,

    /// Head branch to scan instead of the event's.
    #[arg(long)]
    head_ref: Option<String>,

    /// Repository in owner/name form.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// Pull request number, when not running on a pull request event.
    #[arg(long)]
    pr_number: Option<u64>,

    /// GitHub token. GitHub features are disabled without one.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,

    /// Also scan merge commit messages.
    #[arg(long)]
    include_merge_messages: bool,

    /// Issue key shape to accept.
    #[arg(long, default_value = "strict")]
    key_pattern: KeyPattern,

    /// Comma-delimited fix versions to set on every resolved issue, or NONE to clear.
    #[arg(long, requires = "fix_version_mode")]
    fix_versions: Option<String>,

    /// How --fix-versions combines with the versions already set.
    #[arg(long, value_enum)]
    fix_version_mode: Option<FixVersionModeArg>,

    /// Transition to apply when no event specific transition matches.
    #[arg(long)]
    jira_transition: Option<String>,

    /// Transition to apply when a pull request is opened.
    #[arg(long)]
    transition_on_pr_open: Option<String>,

    /// Transition to apply when a pull request is approved.
    #[arg(long)]
    transition_on_pr_approval: Option<String>,

    /// Transition to apply when a pull request is merged.
    #[arg(long)]
    transition_on_pr_merge: Option<String>,

    /// Transition to apply when a branch is created.
    #[arg(long)]
    transition_on_new_branch: Option<String>,

    /// Comma-delimited chain of transitions leading to the target.
    #[arg(long)]
    jira_transition_chain: Option<String>,

    /// Create or update a GitHub issue for every resolved Jira issue.
    #[arg(long)]
    generate_github_issues: bool,

    /// Rewrite the pull request title to "KEY-1, KEY-2: Title Cased Text".
    #[arg(long)]
    standardize_pr_title: bool,

    /// Preview changes without mutating Jira or GitHub.
    #[arg(long)]
    dry_run: bool,

    /// Maximum concurrent Jira requests. Unbounded when unset.
    #[arg(long)]
    concurrency: Option<usize>,

    /// Exit with status 1 when any issue could not be fetched or updated.
    #[arg(long)]
    fail_on_error: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FixVersionModeArg {
    /// Replace the issue's fix versions.
    Replace,
    /// Add to the issue's fix versions.
    Additive,
}

impl From<FixVersionModeArg> for FixVersionMode {
    fn from(mode: FixVersionModeArg) -> Self {
        match mode {
            FixVersionModeArg::Replace => Self::Replace,
            FixVersionModeArg::Additive => Self::Additive,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    // reqwest and octocrab both link rustls; pick one provider for the process.
    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        warn!("A rustls crypto provider was already installed");
    }

    let args = Args::parse();
    let fail_on_error = args.fail_on_error;

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);

            if fail_on_error && summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Sets up the global tracing subscriber with compact output and `RUST_LOG`
/// filtering, defaulting to "info".
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let jira = JiraArgs {
        base_url: args.jira_base_url,
        email: args.jira_user_email,
        token: args.jira_api_token,
    };

    let fix_versions = match (args.fix_versions, args.fix_version_mode) {
        (Some(raw), Some(mode)) => FixVersionOverride::from_list(&raw, mode.into()),
        _ => None,
    };

    let transitions = TransitionTriggers {
        default: args.jira_transition,
        on_pr_open: args.transition_on_pr_open,
        on_pr_approval: args.transition_on_pr_approval,
        on_pr_merge: args.transition_on_pr_merge,
        on_new_branch: args.transition_on_new_branch,
    };

    let config = RunnerConfig::new(jira, args.key_pattern)
        .with_config_path(args.config)
        .with_string(args.string)
        .with_title(args.title)
        .with_head_ref(args.head_ref)
        .with_github(args.repository, args.github_token)
        .with_pr_number(args.pr_number)
        .with_merge_messages(args.include_merge_messages)
        .with_fix_versions(fix_versions)
        .with_transitions(transitions, args.jira_transition_chain)
        .with_github_issues(args.generate_github_issues)
        .with_standardized_title(args.standardize_pr_title)
        .with_dry_run(args.dry_run)
        .with_concurrency(args.concurrency);

    let runner = Runner::new(config)?;
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Candidate keys: {}", summary.candidates);
    println!("  Resolved issues: {}", summary.resolved);
    println!("  Not found: {}", summary.not_found);
    println!("  Fetch failures: {}", summary.fetch_failed);

    if !summary.dry_run {
        println!("  Transitions applied: {}", summary.transitions_applied);
        println!("  Transitions unchanged: {}", summary.transitions_unchanged);
        println!("  Transitions failed: {}", summary.transitions_failed);
        println!("  GitHub issues created: {}", summary.issues_created);
        println!("  GitHub issues updated: {}", summary.issues_updated);
        println!("  GitHub issues failed: {}", summary.issues_failed);
    }
    println!("  Pull request: {}", summary.pull_request.as_str());
}

//! Runner configuration.

use crate::config::JiraArgs;
use crate::event::{EventContext, TransitionTriggers};
use crate::keys::KeyPattern;
use crate::reconcile::FixVersionOverride;
use std::path::{Path, PathBuf};

/// Configuration for a linking run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Jira connection settings as given on the command line.
    jira: JiraArgs,
    /// Optional TOML config file.
    config_path: Option<PathBuf>,
    /// Explicit text to scan for keys.
    string: Option<String>,
    /// Pull request title override.
    title: Option<String>,
    /// Head branch override.
    head_ref: Option<String>,
    /// Repository in `owner/name` form.
    repository: Option<String>,
    /// Pull request number when the event does not carry one.
    pr_number: Option<u64>,
    /// GitHub token; GitHub features are off without one.
    github_token: Option<String>,
    /// Whether merge commit messages are scanned.
    include_merge_messages: bool,
    /// Key shape to accept.
    key_pattern: KeyPattern,
    /// Fix-version override applied to every resolved issue.
    fix_versions: Option<FixVersionOverride>,
    /// Transition to apply per event kind.
    transitions: TransitionTriggers,
    /// Comma-delimited transition chain.
    transition_chain: Option<String>,
    /// Whether to mirror resolved issues as GitHub issues.
    generate_github_issues: bool,
    /// Whether to rewrite the pull request title.
    standardize_pr_title: bool,
    /// Whether to preview changes without mutating Jira or GitHub.
    dry_run: bool,
    /// Maximum concurrent Jira requests; unbounded when unset.
    concurrency: Option<usize>,
    /// Triggering event; read from the environment when unset.
    event: Option<EventContext>,
}

impl RunnerConfig {
    /// Creates a configuration matching keys with `key_pattern` and every
    /// optional feature off.
    pub fn new(jira: JiraArgs, key_pattern: KeyPattern) -> Self {
        Self {
            jira,
            config_path: None,
            string: None,
            title: None,
            head_ref: None,
            repository: None,
            pr_number: None,
            github_token: None,
            include_merge_messages: false,
            key_pattern,
            fix_versions: None,
            transitions: TransitionTriggers::default(),
            transition_chain: None,
            generate_github_issues: false,
            standardize_pr_title: false,
            dry_run: false,
            concurrency: None,
            event: None,
        }
    }

    /// Sets the config file path.
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Sets the explicit text to scan.
    pub fn with_string(mut self, string: Option<String>) -> Self {
        self.string = string;
        self
    }

    /// Sets the pull request title override.
    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Sets the head branch override.
    pub fn with_head_ref(mut self, head_ref: Option<String>) -> Self {
        self.head_ref = head_ref;
        self
    }

    /// Sets the GitHub repository and token.
    pub fn with_github(mut self, repository: Option<String>, token: Option<String>) -> Self {
        self.repository = repository;
        self.github_token = token;
        self
    }

    /// Sets the pull request number.
    pub fn with_pr_number(mut self, number: Option<u64>) -> Self {
        self.pr_number = number;
        self
    }

    /// Sets whether merge commit messages are scanned.
    pub fn with_merge_messages(mut self, include: bool) -> Self {
        self.include_merge_messages = include;
        self
    }

    /// Sets the fix-version override.
    pub fn with_fix_versions(mut self, fix_versions: Option<FixVersionOverride>) -> Self {
        self.fix_versions = fix_versions;
        self
    }

    /// Sets the transitions and the chain leading to them.
    pub fn with_transitions(
        mut self,
        transitions: TransitionTriggers,
        chain: Option<String>,
    ) -> Self {
        self.transitions = transitions;
        self.transition_chain = chain;
        self
    }

    /// Sets whether resolved issues are mirrored as GitHub issues.
    pub fn with_github_issues(mut self, enabled: bool) -> Self {
        self.generate_github_issues = enabled;
        self
    }

    /// Sets whether the pull request title is standardized.
    pub fn with_standardized_title(mut self, enabled: bool) -> Self {
        self.standardize_pr_title = enabled;
        self
    }

    /// Sets dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Caps concurrent Jira requests. Zero means unbounded.
    pub fn with_concurrency(mut self, concurrency: Option<usize>) -> Self {
        self.concurrency = concurrency.filter(|limit| *limit > 0);
        self
    }

    /// Uses `event` instead of reading it from the environment.
    pub fn with_event(mut self, event: EventContext) -> Self {
        self.event = Some(event);
        self
    }

    pub fn jira(&self) -> &JiraArgs {
        &self.jira
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    pub fn string(&self) -> Option<&str> {
        self.string.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn head_ref(&self) -> Option<&str> {
        self.head_ref.as_deref()
    }

    pub fn repository(&self) -> Option<&str> {
        self.repository.as_deref()
    }

    pub fn pr_number(&self) -> Option<u64> {
        self.pr_number
    }

    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref()
    }

    pub fn include_merge_messages(&self) -> bool {
        self.include_merge_messages
    }

    pub fn key_pattern(&self) -> KeyPattern {
        self.key_pattern
    }

    pub fn fix_versions(&self) -> Option<&FixVersionOverride> {
        self.fix_versions.as_ref()
    }

    pub fn transitions(&self) -> &TransitionTriggers {
        &self.transitions
    }

    pub fn transition_chain(&self) -> Option<&str> {
        self.transition_chain.as_deref()
    }

    pub fn generate_github_issues(&self) -> bool {
        self.generate_github_issues
    }

    pub fn standardize_pr_title(&self) -> bool {
        self.standardize_pr_title
    }

    /// Returns whether dry-run mode is enabled.
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Returns the concurrency cap, if any.
    pub fn concurrency(&self) -> Option<usize> {
        self.concurrency
    }

    pub fn event(&self) -> Option<&EventContext> {
        self.event.as_ref()
    }
}

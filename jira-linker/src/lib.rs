#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod config;
pub mod event;
pub mod github;
pub mod jira;
pub mod keys;
pub mod outputs;
pub mod reconcile;
pub mod runner;
pub mod summary;
pub mod templates;

pub use config::{load_config_file, ConfigError, FileConfig, JiraArgs, JiraSettings};
pub use event::{EventContext, EventError, TransitionTriggers};
pub use github::{GitHubError, MirrorStatus, PrUpdateStatus, PullRequestInfo, RepoRef};
pub use jira::{JiraClient, JiraError, TransitionPlan, TransitionStatus};
pub use keys::{
    combine, CandidateKeySet, CommitMessage, ExtractedKeys, IssueKey, KeyExtractor, KeyPattern,
    KeySources,
};
pub use outputs::{ActionOutputs, OutputError, OutputTarget};
pub use reconcile::{
    apply_fix_version_override, FailedFetch, FetchError, FixVersionMode, FixVersionOverride,
    IssueFetcher, IssueReconciler, IssueRecord, Reconciliation,
};
pub use runner::{RunReport, Runner, RunnerConfig, RunnerError};
pub use summary::{IssueOutcome, RunSummary};
pub use templates::{create_handlebars_registry, TemplateError, TemplateRenderer};

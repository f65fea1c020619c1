//! Runner error types.

/// Errors that stop a run before or while it starts.
///
/// Per-issue failures are recorded in the [`RunSummary`](crate::RunSummary)
/// instead.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Jira client initialization errors.
    #[error(transparent)]
    Jira(#[from] crate::jira::JiraError),

    /// GitHub client initialization errors.
    #[error(transparent)]
    GitHub(#[from] crate::github::GitHubError),

    /// The triggering event could not be read.
    #[error(transparent)]
    Event(#[from] crate::event::EventError),

    /// Template errors.
    #[error(transparent)]
    Template(#[from] crate::templates::TemplateError),

    /// Step outputs could not be written.
    #[error(transparent)]
    Output(#[from] crate::outputs::OutputError),
}

//! GitHub integration error types.

use thiserror::Error;

/// Errors that can occur while talking to GitHub.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// GitHub API error.
    #[error("GitHub API error: {0}")]
    GitHubError(#[from] octocrab::Error),

    /// Template rendering failed.
    #[error("Template error: {0}")]
    TemplateError(#[from] crate::templates::TemplateError),

    /// Repository is not of the form `owner/name`.
    #[error("Invalid repository '{0}', expected 'owner/name'")]
    InvalidRepository(String),
}

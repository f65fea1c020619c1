//! Jira client error types.

use thiserror::Error;

/// Errors that can occur while talking to Jira.
#[derive(Debug, Error)]
pub enum JiraError {
    /// Failed to build the HTTP client.
    #[error("Failed to build Jira HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport or decoding error.
    #[error("Jira request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Jira answered with an unexpected status.
    #[error("Jira returned HTTP {status} for {operation} on {key}: {message}")]
    Status {
        operation: &'static str,
        key: String,
        status: u16,
        message: String,
    },

    /// Jira returned an issue key that is not a valid key.
    #[error("Jira returned malformed issue key '{0}'")]
    MalformedKey(String),
}

impl JiraError {
    /// Returns true for authentication and authorization failures.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

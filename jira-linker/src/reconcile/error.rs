//! Fetch error types.

use thiserror::Error;

/// Errors an [`IssueFetcher`](super::IssueFetcher) can report for one key.
///
/// A missing issue is not an error; fetchers return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Jira API error.
    #[error(transparent)]
    Jira(#[from] crate::jira::JiraError),

    /// Any other lookup failure.
    #[error("{0}")]
    Other(String),
}

//! GitHub integration.
//!
//! Reads pull request commits, mirrors Jira issues as GitHub issues and
//! keeps the linked-issue section of a pull request up to date.

mod commits;
mod error;
mod issues;
mod pull_request;
pub mod rate_limit;
mod status;

pub use commits::list_pull_request_commits;
pub use error::GitHubError;
pub use issues::{find_mirrored_issue, list_open_issues, mirror_issue, ExistingIssue};
pub use pull_request::{
    fetch_pull_request, splice_linked_issues, standardize_title, title_case, update_pull_request,
    PullRequestInfo, StandardTitle,
};
pub use status::{MirrorStatus, PrUpdateStatus};

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A repository in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoRef {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,
}

impl FromStr for RepoRef {
    type Err = GitHubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GitHubError::InvalidRepository(s.to_string());
        let (owner, name) = s.trim().split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Builds an authenticated GitHub client.
///
/// # Errors
///
/// Returns an error if the client cannot be built.
pub fn build_client(token: &str) -> Result<octocrab::Octocrab, GitHubError> {
    Ok(octocrab::Octocrab::builder()
        .personal_token(token.to_string())
        .build()?)
}

//! Pull request commit listing.

use super::{GitHubError, RepoRef};
use crate::keys::CommitMessage;
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, Instrument};

/// Results per page for commit listing.
const RESULTS_PER_PAGE: usize = 100;

/// GitHub stops listing pull request commits after this many.
const MAX_COMMITS: usize = 250;

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitMessage,
}

#[derive(Serialize)]
struct PageParams {
    per_page: usize,
    page: usize,
}

/// Lists the commit messages of a pull request, oldest first.
///
/// # Errors
///
/// Returns [`GitHubError`] if a page request fails.
pub async fn list_pull_request_commits(
    octocrab: &Octocrab,
    repo: &RepoRef,
    number: u64,
) -> Result<Vec<CommitMessage>, GitHubError> {
    let span = info_span!("list_commits", repo = %repo, pr = number);

    async {
        let route = format!("/repos/{}/{}/pulls/{number}/commits", repo.owner, repo.name);
        let mut messages = Vec::new();

        for page in 1.. {
            let params = PageParams {
                per_page: RESULTS_PER_PAGE,
                page,
            };
            let entries: Vec<CommitEntry> = octocrab.get(&route, Some(&params)).await?;
            let fetched = entries.len();
            messages.extend(entries.into_iter().map(|entry| entry.commit));

            if fetched < RESULTS_PER_PAGE || messages.len() >= MAX_COMMITS {
                break;
            }
        }

        debug!(count = messages.len(), "Listed pull request commits");
        Ok(messages)
    }
    .instrument(span)
    .await
}

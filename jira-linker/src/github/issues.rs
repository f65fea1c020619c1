//! Mirroring Jira issues as GitHub issues.

use super::rate_limit::ensure_core_rate_limit;
use super::{GitHubError, MirrorStatus, RepoRef};
use crate::keys::IssueKey;
use octocrab::models::issues::Issue;
use octocrab::params::State;
use octocrab::Octocrab;
use tracing::{debug, info, info_span, warn, Instrument};

/// Results per page for issue listing.
const RESULTS_PER_PAGE: u8 = 100;

/// An open issue or pull request already in the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingIssue {
    pub number: u64,
    pub title: String,
    pub is_pull_request: bool,
}

impl From<&Issue> for ExistingIssue {
    fn from(issue: &Issue) -> Self {
        Self {
            number: issue.number,
            title: issue.title.clone(),
            is_pull_request: issue.pull_request.is_some(),
        }
    }
}

/// Finds the first open issue, not pull request, whose title mentions `key`.
///
/// The key must appear as a whole token, so `ABC-12` does not match `ABC-123`.
#[must_use]
pub fn find_mirrored_issue(existing: &[ExistingIssue], key: &IssueKey) -> Option<u64> {
    existing
        .iter()
        .find(|issue| !issue.is_pull_request && mentions_key(&issue.title, key.as_str()))
        .map(|issue| issue.number)
}

fn mentions_key(title: &str, key: &str) -> bool {
    title.match_indices(key).any(|(start, _)| {
        let before = title[..start].chars().next_back();
        let after = title[start + key.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Lists every open issue in the repository.
///
/// # Errors
///
/// Returns [`GitHubError`] if a page request fails.
pub async fn list_open_issues(
    octocrab: &Octocrab,
    repo: &RepoRef,
) -> Result<Vec<ExistingIssue>, GitHubError> {
    let mut page = octocrab
        .issues(&repo.owner, &repo.name)
        .list()
        .state(State::Open)
        .per_page(RESULTS_PER_PAGE)
        .send()
        .await?;

    let mut issues: Vec<ExistingIssue> = page.items.iter().map(ExistingIssue::from).collect();

    while let Some(next_page) = octocrab.get_page::<Issue>(&page.next).await? {
        issues.extend(next_page.items.iter().map(ExistingIssue::from));
        page.next = next_page.next;
    }

    debug!(count = issues.len(), "Listed open issues");
    Ok(issues)
}

/// Creates or updates the GitHub issue mirroring a Jira issue.
///
/// `existing` is the repository's open issue list; a newly created issue is
/// appended to it so later keys see it.
pub async fn mirror_issue(
    octocrab: &Octocrab,
    repo: &RepoRef,
    existing: &mut Vec<ExistingIssue>,
    key: &IssueKey,
    title: &str,
    body: &str,
) -> MirrorStatus {
    let span = info_span!("mirror_issue", repo = %repo, key = %key);

    async {
        let result = match find_mirrored_issue(existing, key) {
            Some(number) => update_issue(octocrab, repo, number, title, body)
                .await
                .map(|url| MirrorStatus::Updated { number, url }),
            None => create_issue(octocrab, repo, title, body)
                .await
                .map(|(number, url)| {
                    existing.push(ExistingIssue {
                        number,
                        title: title.to_string(),
                        is_pull_request: false,
                    });
                    MirrorStatus::Created { number, url }
                }),
        };

        match result {
            Ok(status) => {
                info!(status = status.as_str(), "Mirrored issue");
                status
            }
            Err(e) => {
                warn!(error = %e, "Failed to mirror issue");
                MirrorStatus::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
    .instrument(span)
    .await
}

async fn update_issue(
    octocrab: &Octocrab,
    repo: &RepoRef,
    number: u64,
    title: &str,
    body: &str,
) -> Result<String, GitHubError> {
    ensure_core_rate_limit(octocrab).await?;
    let issue = octocrab
        .issues(&repo.owner, &repo.name)
        .update(number)
        .title(title)
        .body(body)
        .send()
        .await?;
    Ok(issue.html_url.to_string())
}

async fn create_issue(
    octocrab: &Octocrab,
    repo: &RepoRef,
    title: &str,
    body: &str,
) -> Result<(u64, String), GitHubError> {
    ensure_core_rate_limit(octocrab).await?;
    let issue = octocrab
        .issues(&repo.owner, &repo.name)
        .create(title)
        .body(body)
        .send()
        .await?;
    Ok((issue.number, issue.html_url.to_string()))
}

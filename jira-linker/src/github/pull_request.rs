//! Pull request title and body maintenance.

use super::rate_limit::ensure_core_rate_limit;
use super::{GitHubError, RepoRef};
use crate::keys::IssueKey;
use octocrab::Octocrab;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::{debug, info, info_span, Instrument};

const SECTION_START: &str = "[/]: / \"JIRA-ISSUE-TEXT-START\"";
const SECTION_END: &str = "[/]: / \"JIRA-ISSUE-TEXT-END\"";
const SECTION_HEADING: &str = "### Linked Jira Issues:";

/// Longest title a standardized pull request title is cut to.
const MAX_TITLE_CHARS: usize = 71;

/// Titles such as `ABC-123: fix login` or `[ABC-123, ABC-124] fix login`.
/// The keys must lead the title.
static KEYED_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[?(?<issues>(?:[A-Za-z][A-Za-z0-9]{1,7}[_-]\d{3,5}\b(?:[ ,]+)?)+)[ :\]_-]+(?<title>.*)?",
    )
    .expect("keyed title regex is valid")
});

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w\S*").expect("word regex is valid"));

/// The parts of a pull request this crate reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestInfo {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub head_ref: Option<String>,
    pub base_ref: Option<String>,
}

/// A rewritten pull request title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardTitle {
    /// Full new title, keys first.
    pub title: String,
    /// The title text without keys, title cased.
    pub text: String,
}

/// Upper-cases the first character of every word.
#[must_use]
pub fn title_case(text: &str) -> String {
    WORD.replace_all(text, |caps: &Captures| {
        let word = &caps[0];
        let mut chars = word.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    })
    .into_owned()
}

/// Rewrites a title that starts with issue keys to `"{keys}: {Title Cased Text}"`.
///
/// Returns `None` when the title does not follow the keyed pattern.
#[must_use]
pub fn standardize_title(title: &str, keys: &[IssueKey]) -> Option<StandardTitle> {
    let caps = KEYED_TITLE.captures(title.trim())?;
    let text = title_case(caps.name("title").map_or("", |m| m.as_str()).trim());

    let keys = keys
        .iter()
        .map(IssueKey::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let title = format!("{keys}: {text}")
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();

    Some(StandardTitle { title, text })
}

/// Replaces the linked-issue section of a pull request body with `list`,
/// appending the section if the body has none.
#[must_use]
pub fn splice_linked_issues(body: &str, list: &str) -> String {
    let section = format!("{SECTION_HEADING}\n\n{list}\n");

    if let Some(start) = body.find(SECTION_START) {
        let content_start = start + SECTION_START.len();
        if let Some(end) = body[content_start..].rfind(SECTION_END) {
            let end = content_start + end;
            let before = &body[..content_start];
            let after = &body[end..];
            return format!("{before}\n{section}\n{after}");
        }
    }

    format!(
        "{}\n\n{SECTION_START}\n{section}\n{SECTION_END}",
        body.trim()
    )
}

/// Reads a pull request.
///
/// # Errors
///
/// Returns [`GitHubError`] if the request fails.
pub async fn fetch_pull_request(
    octocrab: &Octocrab,
    repo: &RepoRef,
    number: u64,
) -> Result<PullRequestInfo, GitHubError> {
    let pr = octocrab.pulls(&repo.owner, &repo.name).get(number).await?;
    Ok(PullRequestInfo {
        number: pr.number,
        title: pr.title.unwrap_or_default(),
        body: pr.body.unwrap_or_default(),
        head_ref: Some(pr.head.ref_field),
        base_ref: Some(pr.base.ref_field),
    })
}

/// Writes a new body, and optionally a new title, to a pull request.
///
/// # Errors
///
/// Returns [`GitHubError`] if the update fails.
pub async fn update_pull_request(
    octocrab: &Octocrab,
    repo: &RepoRef,
    number: u64,
    title: Option<&str>,
    body: &str,
) -> Result<(), GitHubError> {
    let span = info_span!("update_pull_request", repo = %repo, pr = number);

    async {
        debug!(title_changed = title.is_some(), "Updating pull request");
        ensure_core_rate_limit(octocrab).await?;

        let pulls = octocrab.pulls(&repo.owner, &repo.name);
        let mut update = pulls.update(number).body(body);
        if let Some(title) = title {
            update = update.title(title);
        }
        update.send().await?;

        info!("Pull request updated");
        Ok(())
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPattern;

    fn keys(raw: &[&str]) -> Vec<IssueKey> {
        raw.iter()
            .map(|k| IssueKey::parse(k, KeyPattern::Strict).unwrap())
            .collect()
    }

    #[test]
    fn title_cases_words() {
        assert_eq!(title_case("fix the login page"), "Fix The Login Page");
        assert_eq!(title_case("keep CAPS and e-mail"), "Keep CAPS And E-mail");
    }

    #[test]
    fn standardizes_keyed_titles() {
        let result = standardize_title("abc-123: fix login", &keys(&["ABC-123"])).unwrap();
        assert_eq!(result.title, "ABC-123: Fix Login");
        assert_eq!(result.text, "Fix Login");

        let result =
            standardize_title("[ABC-123, ABC-124] fix login", &keys(&["ABC-123", "ABC-124"]))
                .unwrap();
        assert_eq!(result.title, "ABC-123, ABC-124: Fix Login");
    }

    #[test]
    fn leaves_unkeyed_titles_alone() {
        assert_eq!(standardize_title("Fix login", &keys(&["ABC-123"])), None);
    }

    #[test]
    fn ignores_keys_after_the_start() {
        assert_eq!(
            standardize_title("Fix login for ABC-123 users", &keys(&["ABC-123"])),
            None
        );
        assert_eq!(
            standardize_title("Fix issue 1234 in parser", &keys(&["ABC-123"])),
            None
        );
    }

    #[test]
    fn limits_title_length() {
        let long = format!("ABC-123: {}", "word ".repeat(30));
        let result = standardize_title(&long, &keys(&["ABC-123"])).unwrap();
        assert_eq!(result.title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn appends_section_to_body_without_one() {
        let body = splice_linked_issues("Some description\n\n", "* ABC-1");
        assert_eq!(
            body,
            "Some description\n\n\
             [/]: / \"JIRA-ISSUE-TEXT-START\"\n\
             ### Linked Jira Issues:\n\n* ABC-1\n\n\
             [/]: / \"JIRA-ISSUE-TEXT-END\""
        );
    }

    #[test]
    fn replaces_existing_section() {
        let first = splice_linked_issues("Intro", "* ABC-1");
        let with_footer = format!("{first}\n\nFooter");

        let second = splice_linked_issues(&with_footer, "* ABC-2");

        assert_eq!(second, first.replace("ABC-1", "ABC-2") + "\n\nFooter");
        assert!(second.contains("* ABC-2"));
        assert!(!second.contains("* ABC-1"));
        assert!(second.ends_with("[/]: / \"JIRA-ISSUE-TEXT-END\"\n\nFooter"));
        assert_eq!(splice_linked_issues(&second, "* ABC-2"), second);
    }
}

//! Issue key extraction.
//!
//! This module pulls candidate Jira issue keys out of the free text attached
//! to a change: an explicit input string, the pull request title, the head
//! branch reference and the commit messages. Extraction never fails; text
//! without keys simply yields an empty [`CandidateKeySet`].

mod commit;
mod key;
mod set;

pub use commit::CommitMessage;
pub use key::{IssueKey, KeyPattern};
pub use set::CandidateKeySet;

use tracing::debug;

/// Text sources scanned for issue keys.
#[derive(Debug, Clone, Default)]
pub struct KeySources {
    /// Explicit input string.
    pub string: Option<String>,
    /// Pull request title.
    pub title: Option<String>,
    /// Head branch reference (e.g. `refs/heads/ABC-123-login`).
    pub head_ref: Option<String>,
    /// Commit messages of the change.
    pub commits: Vec<CommitMessage>,
    /// Whether merge commit messages are scanned too.
    pub include_merge_messages: bool,
}

/// Keys found in each source, plus their union.
#[derive(Debug, Clone, Default)]
pub struct ExtractedKeys {
    pub from_string: CandidateKeySet,
    pub from_title: CandidateKeySet,
    pub from_ref: CandidateKeySet,
    pub from_commits: CandidateKeySet,
    /// Union in precedence order: string, title, ref, commits.
    pub combined: CandidateKeySet,
}

/// Finds issue keys in text using a fixed [`KeyPattern`].
#[derive(Debug, Clone, Copy)]
pub struct KeyExtractor {
    pattern: KeyPattern,
}

impl KeyExtractor {
    #[must_use]
    pub fn new(pattern: KeyPattern) -> Self {
        Self { pattern }
    }

    /// Extracts the keys in `text`. Absent or empty text yields an empty set.
    #[must_use]
    pub fn extract_from_text(&self, text: Option<&str>) -> CandidateKeySet {
        match text {
            Some(text) if !text.trim().is_empty() => self.pattern.find_keys(text).collect(),
            _ => CandidateKeySet::new(),
        }
    }

    /// Extracts the keys from commit messages.
    ///
    /// Merge commits often mention keys of the branch being merged in, so they
    /// are skipped unless `include_merges` is set.
    #[must_use]
    pub fn extract_from_commits(
        &self,
        commits: &[CommitMessage],
        include_merges: bool,
    ) -> CandidateKeySet {
        let mut keys = CandidateKeySet::new();
        for commit in commits {
            if commit.is_merge() && !include_merges {
                debug!(message = %first_line(&commit.message), "Skipping merge commit");
                continue;
            }
            keys.union_with(&self.extract_from_text(Some(&commit.message)));
        }
        keys
    }

    /// Extracts keys from every source and combines them.
    #[must_use]
    pub fn extract_all(&self, sources: &KeySources) -> ExtractedKeys {
        let from_string = self.extract_from_text(sources.string.as_deref());
        let from_title = self.extract_from_text(sources.title.as_deref());
        let from_ref = self.extract_from_text(sources.head_ref.as_deref());
        let from_commits =
            self.extract_from_commits(&sources.commits, sources.include_merge_messages);
        let combined = combine([&from_string, &from_title, &from_ref, &from_commits]);

        debug!(
            string = from_string.len(),
            title = from_title.len(),
            head_ref = from_ref.len(),
            commits = from_commits.len(),
            combined = combined.len(),
            "Extracted issue keys"
        );

        ExtractedKeys {
            from_string,
            from_title,
            from_ref,
            from_commits,
            combined,
        }
    }
}

/// Unions the given sets, keeping the order in which keys first appear.
#[must_use]
pub fn combine<'a>(sets: impl IntoIterator<Item = &'a CandidateKeySet>) -> CandidateKeySet {
    let mut combined = CandidateKeySet::new();
    for set in sets {
        combined.union_with(set);
    }
    combined
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}

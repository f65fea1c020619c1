//! Commit messages as a key source.

use serde::Deserialize;

/// Message prefixes git and GitHub use for merge commits.
const MERGE_PREFIXES: [&str; 2] = ["Merge branch", "Merge pull"];

/// A commit message to scan for issue keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitMessage {
    /// Full commit message, subject and body.
    pub message: String,
}

impl CommitMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns true for messages generated by merging a branch or pull request.
    #[must_use]
    pub fn is_merge(&self) -> bool {
        MERGE_PREFIXES
            .iter()
            .any(|prefix| self.message.starts_with(prefix))
    }
}

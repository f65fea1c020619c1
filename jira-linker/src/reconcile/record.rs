//! Resolved issue records.

use crate::keys::IssueKey;
use serde::Serialize;

/// A Jira issue confirmed to exist, with the fields downstream stages use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueRecord {
    /// Issue key as reported by Jira.
    pub key: IssueKey,

    /// One-line summary.
    pub summary: String,

    /// Issue description.
    pub description: Option<String>,

    /// Project key (e.g. "ABC").
    pub project_key: Option<String>,

    /// Project display name.
    pub project_name: Option<String>,

    /// Priority name (e.g. "High").
    pub priority: Option<String>,

    /// Workflow status name (e.g. "In Progress").
    pub status: Option<String>,

    /// Fix version names, after any override.
    pub fix_versions: Vec<String>,

    /// Due date as reported by Jira (`YYYY-MM-DD`).
    pub due_date: Option<String>,

    /// Number of the mirrored GitHub issue, once one exists.
    pub github_number: Option<u64>,
}

impl IssueRecord {
    /// Creates a record with only a key and summary set.
    pub fn new(key: IssueKey, summary: impl Into<String>) -> Self {
        Self {
            key,
            summary: summary.into(),
            description: None,
            project_key: None,
            project_name: None,
            priority: None,
            status: None,
            fix_versions: Vec::new(),
            due_date: None,
            github_number: None,
        }
    }

    /// Sets the fix versions.
    #[must_use]
    pub fn with_fix_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fix_versions = versions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the workflow status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

//! The parts of Jira REST responses this crate reads.

use super::JiraError;
use crate::keys::{IssueKey, KeyPattern};
use crate::reconcile::IssueRecord;
use serde::Deserialize;

/// An issue as returned by `GET /rest/api/2/issue/{key}`.
#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFields {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub project: Option<Project>,
    pub fix_versions: Option<Vec<Named>>,
    pub priority: Option<Named>,
    pub status: Option<Named>,
    #[serde(rename = "duedate")]
    pub due_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub key: String,
    pub name: Option<String>,
}

/// Any Jira entity identified by its display name.
#[derive(Debug, Clone, Deserialize)]
pub struct Named {
    pub name: String,
}

/// A workflow transition currently available on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionList {
    #[serde(default)]
    pub transitions: Vec<Transition>,
}

/// Error body Jira sends with 4xx/5xx responses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error_messages: Vec<String>,
}

impl TryFrom<JiraIssue> for IssueRecord {
    type Error = JiraError;

    fn try_from(issue: JiraIssue) -> Result<Self, Self::Error> {
        // Jira's own keys may be shorter than the strict pattern allows.
        let key = IssueKey::parse(&issue.key, KeyPattern::Loose)
            .ok_or_else(|| JiraError::MalformedKey(issue.key.clone()))?;
        let fields = issue.fields;

        Ok(Self {
            key,
            summary: fields.summary.unwrap_or_default(),
            description: fields.description.filter(|d| !d.trim().is_empty()),
            project_key: fields.project.as_ref().map(|p| p.key.clone()),
            project_name: fields.project.and_then(|p| p.name),
            priority: fields.priority.map(|p| p.name),
            status: fields.status.map(|s| s.name),
            fix_versions: fields
                .fix_versions
                .unwrap_or_default()
                .into_iter()
                .map(|v| v.name)
                .collect(),
            due_date: fields.due_date,
            github_number: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_issue_into_record() {
        let issue: JiraIssue = serde_json::from_value(serde_json::json!({
            "id": "10001",
            "key": "ABC-123",
            "fields": {
                "summary": "Login fails",
                "description": "Steps to reproduce",
                "project": { "key": "ABC", "name": "Alphabet" },
                "fixVersions": [{ "name": "1.0" }, { "name": "1.1" }],
                "priority": { "name": "High" },
                "status": { "name": "In Progress" },
                "duedate": "2024-05-01"
            }
        }))
        .unwrap();

        let record = IssueRecord::try_from(issue).unwrap();

        assert_eq!(record.key.as_str(), "ABC-123");
        assert_eq!(record.summary, "Login fails");
        assert_eq!(record.project_key.as_deref(), Some("ABC"));
        assert_eq!(record.project_name.as_deref(), Some("Alphabet"));
        assert_eq!(record.fix_versions, ["1.0", "1.1"]);
        assert_eq!(record.status.as_deref(), Some("In Progress"));
        assert_eq!(record.due_date.as_deref(), Some("2024-05-01"));
        assert_eq!(record.github_number, None);
    }

    #[test]
    fn tolerates_null_and_missing_fields() {
        let issue: JiraIssue = serde_json::from_value(serde_json::json!({
            "key": "AB-1",
            "fields": { "summary": "Short key", "fixVersions": null, "priority": null }
        }))
        .unwrap();

        let record = IssueRecord::try_from(issue).unwrap();

        assert_eq!(record.key.as_str(), "AB-1");
        assert!(record.fix_versions.is_empty());
        assert_eq!(record.priority, None);
        assert_eq!(record.description, None);
    }
}

//! Jira REST client.
//!
//! Wraps the handful of Jira Cloud REST v2 endpoints this crate needs:
//! reading an issue, listing its workflow transitions and applying one.

mod error;
mod model;
mod transitions;

pub use error::JiraError;
pub use model::{IssueFields, JiraIssue, Named, Project, Transition};
pub use transitions::{apply_transition_plan, find_transition, TransitionPlan, TransitionStatus};

use crate::config::JiraSettings;
use crate::keys::IssueKey;
use crate::reconcile::{FetchError, IssueFetcher, IssueRecord};
use async_trait::async_trait;
use model::{ErrorBody, TransitionList};
use reqwest::{header, RequestBuilder, Response, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

const HTTP_TIMEOUT_SECS: u64 = 15;
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fields requested when reading an issue.
const ISSUE_FIELDS: &str = "summary,description,project,fixVersions,priority,status,duedate";

/// Authenticated Jira client.
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    settings: JiraSettings,
}

impl JiraClient {
    /// Creates a client using basic auth with the configured email and API token.
    ///
    /// # Errors
    ///
    /// Returns [`JiraError::Client`] if the HTTP client cannot be built.
    pub fn new(settings: JiraSettings) -> Result<Self, JiraError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(JiraError::Client)?;

        Ok(Self { http, settings })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.settings.base_url()
    }

    /// Returns the browser URL of an issue.
    #[must_use]
    pub fn browse_url(&self, key: &IssueKey) -> String {
        format!("{}/browse/{key}", self.base_url())
    }

    /// Reads an issue. Returns `Ok(None)` if Jira does not know the key.
    ///
    /// # Errors
    ///
    /// Returns [`JiraError`] on transport errors or unexpected statuses.
    pub async fn get_issue(&self, key: &IssueKey) -> Result<Option<JiraIssue>, JiraError> {
        debug!(key = %key, "Reading Jira issue");

        let request = self
            .http
            .get(self.issue_url(key, ""))
            .query(&[("fields", ISSUE_FIELDS)]);
        let response = self.send(request).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response, "get issue", key).await?;
        Ok(Some(response.json().await?))
    }

    /// Lists the transitions currently available on an issue.
    ///
    /// # Errors
    ///
    /// Returns [`JiraError`] on transport errors or unexpected statuses.
    pub async fn get_transitions(&self, key: &IssueKey) -> Result<Vec<Transition>, JiraError> {
        let request = self.http.get(self.issue_url(key, "/transitions"));
        let response = self.send(request).await?;
        let response = check_status(response, "list transitions", key).await?;
        let list: TransitionList = response.json().await?;
        Ok(list.transitions)
    }

    /// Applies a transition to an issue.
    ///
    /// # Errors
    ///
    /// Returns [`JiraError`] on transport errors or unexpected statuses.
    pub async fn transition_issue(
        &self,
        key: &IssueKey,
        transition_id: &str,
    ) -> Result<(), JiraError> {
        debug!(key = %key, transition_id, "Applying Jira transition");

        let request = self
            .http
            .post(self.issue_url(key, "/transitions"))
            .json(&json!({ "transition": { "id": transition_id } }));
        let response = self.send(request).await?;
        check_status(response, "transition issue", key).await?;
        Ok(())
    }

    fn issue_url(&self, key: &IssueKey, suffix: &str) -> String {
        format!("{}/rest/api/2/issue/{key}{suffix}", self.base_url())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, JiraError> {
        Ok(request
            .basic_auth(self.settings.email(), Some(self.settings.token()))
            .send()
            .await?)
    }
}

#[async_trait]
impl IssueFetcher for JiraClient {
    async fn fetch_issue(&self, key: &IssueKey) -> Result<Option<IssueRecord>, FetchError> {
        let Some(issue) = self.get_issue(key).await? else {
            return Ok(None);
        };
        Ok(Some(IssueRecord::try_from(issue)?))
    }
}

/// Passes successful responses through and turns the rest into [`JiraError::Status`].
async fn check_status(
    response: Response,
    operation: &'static str,
    key: &IssueKey,
) -> Result<Response, JiraError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .filter(|parsed| !parsed.error_messages.is_empty())
        .map_or(body, |parsed| parsed.error_messages.join("; "));

    Err(JiraError::Status {
        operation,
        key: key.to_string(),
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPattern;

    fn client(base_url: &str) -> JiraClient {
        let settings = JiraSettings::new(base_url, "bot@example.com", "secret").unwrap();
        JiraClient::new(settings).unwrap()
    }

    #[test]
    fn builds_urls_without_double_slashes() {
        let client = client("https://example.atlassian.net/");
        let key = IssueKey::parse("ABC-123", KeyPattern::Strict).unwrap();

        assert_eq!(
            client.browse_url(&key),
            "https://example.atlassian.net/browse/ABC-123"
        );
        assert_eq!(
            client.issue_url(&key, "/transitions"),
            "https://example.atlassian.net/rest/api/2/issue/ABC-123/transitions"
        );
    }

    #[test]
    fn keeps_base_url_path_prefix() {
        let client = client("https://example.com/jira");
        let key = IssueKey::parse("ABC-123", KeyPattern::Strict).unwrap();

        assert_eq!(
            client.browse_url(&key),
            "https://example.com/jira/browse/ABC-123"
        );
    }
}

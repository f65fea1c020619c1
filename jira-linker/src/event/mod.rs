//! The GitHub Actions event that triggered the run.
//!
//! Only the handful of payload fields used for key extraction and
//! transition selection are read; everything else is ignored.

mod error;
mod triggers;

pub use error::EventError;
pub use triggers::TransitionTriggers;

use crate::github::PullRequestInfo;
use crate::keys::CommitMessage;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

const EVENT_NAME_ENV: &str = "GITHUB_EVENT_NAME";
const EVENT_PATH_ENV: &str = "GITHUB_EVENT_PATH";

/// Name and payload of the triggering event.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    /// Event name, e.g. `pull_request` or `push`.
    pub name: Option<String>,

    /// Parsed event payload.
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    pub action: Option<String>,
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub pull_request: Option<PullRequestPayload>,
    pub review: Option<ReviewPayload>,
    /// Pushed commits; only present on `push` events.
    #[serde(default)]
    pub commits: Vec<CommitMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestPayload {
    pub number: u64,
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(default)]
    pub merged: bool,
    pub head: Option<BranchPayload>,
    pub base: Option<BranchPayload>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BranchPayload {
    #[serde(rename = "ref")]
    pub git_ref: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewPayload {
    pub state: Option<String>,
}

impl EventContext {
    /// Reads the event from `GITHUB_EVENT_NAME` and `GITHUB_EVENT_PATH`.
    ///
    /// Outside of GitHub Actions, where neither is set, the context is empty.
    ///
    /// # Errors
    ///
    /// Returns [`EventError`] if the event file cannot be read or parsed.
    pub fn from_env() -> Result<Self, EventError> {
        let name = std::env::var(EVENT_NAME_ENV)
            .ok()
            .filter(|name| !name.is_empty());
        let payload = match std::env::var(EVENT_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::read_payload(Path::new(&path))?,
            _ => EventPayload::default(),
        };

        debug!(event = ?name, "Read GitHub event");
        Ok(Self { name, payload })
    }

    fn read_payload(path: &Path) -> Result<EventPayload, EventError> {
        let contents = std::fs::read_to_string(path).map_err(|e| EventError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| EventError::JsonError {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Returns true if the event name equals `name`.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }

    /// Returns the pull request the event is about, if any.
    #[must_use]
    pub fn pull_request(&self) -> Option<PullRequestInfo> {
        let pr = self.payload.pull_request.as_ref()?;
        Some(PullRequestInfo {
            number: pr.number,
            title: pr.title.clone().unwrap_or_default(),
            body: pr.body.clone().unwrap_or_default(),
            head_ref: pr.head.as_ref().map(|b| b.git_ref.clone()),
            base_ref: pr.base.as_ref().map(|b| b.git_ref.clone()),
        })
    }

    /// Head branch: the pull request head, else the pushed or created ref.
    #[must_use]
    pub fn head_ref(&self) -> Option<String> {
        self.payload
            .pull_request
            .as_ref()
            .and_then(|pr| pr.head.as_ref())
            .map(|b| b.git_ref.clone())
            .or_else(|| self.payload.git_ref.as_deref().map(short_ref))
    }

    /// Base branch of the pull request.
    #[must_use]
    pub fn base_ref(&self) -> Option<String> {
        self.payload
            .pull_request
            .as_ref()
            .and_then(|pr| pr.base.as_ref())
            .map(|b| b.git_ref.clone())
    }
}

/// Strips the `refs/heads/` or `refs/tags/` prefix from a ref.
fn short_ref(git_ref: &str) -> String {
    git_ref
        .strip_prefix("refs/heads/")
        .or_else(|| git_ref.strip_prefix("refs/tags/"))
        .unwrap_or(git_ref)
        .to_string()
}

//! Per-issue outcome types.

use crate::github::MirrorStatus;
use crate::jira::TransitionStatus;
use crate::keys::IssueKey;
use serde::Serialize;

/// What happened to one resolved issue after reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct IssueOutcome {
    /// Issue key.
    pub key: IssueKey,

    /// Workflow transition status, if a transition was requested.
    pub transition: Option<TransitionStatus>,

    /// GitHub issue mirroring status, if mirroring was requested.
    pub mirror: Option<MirrorStatus>,
}

impl IssueOutcome {
    #[must_use]
    pub fn new(key: IssueKey) -> Self {
        Self {
            key,
            transition: None,
            mirror: None,
        }
    }
}

//! Run summary types.

use super::result::IssueOutcome;
use crate::github::{MirrorStatus, PrUpdateStatus};
use crate::jira::TransitionStatus;
use crate::reconcile::Reconciliation;
use serde::Serialize;

/// Summary of a complete run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Number of distinct candidate keys extracted.
    pub candidates: usize,

    /// Number of candidates confirmed to exist.
    pub resolved: usize,

    /// Number of candidates Jira does not know.
    pub not_found: usize,

    /// Number of candidates whose lookup failed.
    pub fetch_failed: usize,

    /// Number of issues moved through at least one transition.
    pub transitions_applied: usize,

    /// Number of issues whose transitions were all unavailable.
    pub transitions_unchanged: usize,

    /// Number of issues whose transitions failed.
    pub transitions_failed: usize,

    /// Number of GitHub issues created.
    pub issues_created: usize,

    /// Number of GitHub issues updated.
    pub issues_updated: usize,

    /// Number of GitHub issues skipped.
    pub issues_skipped: usize,

    /// Number of GitHub issues that failed to sync.
    pub issues_failed: usize,

    /// Pull request update status.
    pub pull_request: PrUpdateStatus,

    /// Whether this was a dry run.
    pub dry_run: bool,
}

impl RunSummary {
    /// Creates a new empty summary.
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Records the extraction and reconciliation counts.
    pub fn record_reconciliation(&mut self, candidates: usize, reconciliation: &Reconciliation) {
        self.candidates = candidates;
        self.resolved = reconciliation.records.len();
        self.not_found = reconciliation.not_found.len();
        self.fetch_failed = reconciliation.failed.len();
    }

    /// Updates the summary with one issue's outcome.
    pub fn record_outcome(&mut self, outcome: &IssueOutcome) {
        match &outcome.transition {
            Some(TransitionStatus::Applied { .. }) => self.transitions_applied += 1,
            Some(TransitionStatus::Unchanged) => self.transitions_unchanged += 1,
            Some(TransitionStatus::Failed { .. }) => self.transitions_failed += 1,
            None => {}
        }
        match &outcome.mirror {
            Some(MirrorStatus::Created { .. }) => self.issues_created += 1,
            Some(MirrorStatus::Updated { .. }) => self.issues_updated += 1,
            Some(MirrorStatus::Skipped { .. }) => self.issues_skipped += 1,
            Some(MirrorStatus::Failed { .. }) => self.issues_failed += 1,
            None => {}
        }
    }

    /// Returns true if any failures occurred.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.fetch_failed > 0
            || self.transitions_failed > 0
            || self.issues_failed > 0
            || matches!(self.pull_request, PrUpdateStatus::Failed { .. })
    }

    /// Returns true if all operations were successful.
    #[must_use]
    pub fn all_success(&self) -> bool {
        !self.has_failures()
    }
}

//! Issue reconciliation.
//!
//! Confirms candidate keys against the issue tracker. Every distinct
//! candidate is fetched exactly once, all fetches run concurrently, and the
//! results are only inspected once every fetch has settled. Keys that do not
//! resolve, or whose fetch fails, are dropped without aborting the batch.

mod error;
mod fix_versions;
mod record;

pub use error::FetchError;
pub use fix_versions::{apply_fix_version_override, FixVersionMode, FixVersionOverride};
pub use record::IssueRecord;

use crate::keys::{CandidateKeySet, IssueKey};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// Looks up a single issue in the tracker.
#[async_trait]
pub trait IssueFetcher: Send + Sync {
    /// Returns the issue for `key`, or `Ok(None)` if it does not exist.
    async fn fetch_issue(&self, key: &IssueKey) -> Result<Option<IssueRecord>, FetchError>;
}

#[async_trait]
impl<T: IssueFetcher + ?Sized> IssueFetcher for Arc<T> {
    async fn fetch_issue(&self, key: &IssueKey) -> Result<Option<IssueRecord>, FetchError> {
        (**self).fetch_issue(key).await
    }
}

/// A candidate whose fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFetch {
    /// Candidate key.
    pub key: IssueKey,
    /// Error message.
    pub error: String,
}

/// Outcome of reconciling a candidate set.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Issues that exist, in candidate order.
    pub records: Vec<IssueRecord>,
    /// Candidates the tracker does not know.
    pub not_found: Vec<IssueKey>,
    /// Candidates whose lookup failed.
    pub failed: Vec<FailedFetch>,
}

enum Resolution {
    Found(IssueRecord),
    NotFound(IssueKey),
    Failed(FailedFetch),
}

/// Resolves candidate keys into [`IssueRecord`]s.
pub struct IssueReconciler<F> {
    fetcher: F,
    fix_versions: Option<FixVersionOverride>,
    concurrency: Option<usize>,
}

impl<F: IssueFetcher> IssueReconciler<F> {
    /// Creates a reconciler that looks issues up through `fetcher`.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            fix_versions: None,
            concurrency: None,
        }
    }

    /// Sets the fix version override applied to every resolved issue.
    #[must_use]
    pub fn with_fix_version_override(mut self, fix_versions: Option<FixVersionOverride>) -> Self {
        self.fix_versions = fix_versions;
        self
    }

    /// Caps the number of lookups in flight. Unbounded by default.
    #[must_use]
    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = Some(limit.max(1));
        self
    }

    /// Returns the injected fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Resolves `candidates`, returning only the issues that exist.
    pub async fn resolve(&self, candidates: &CandidateKeySet) -> Vec<IssueRecord> {
        self.reconcile(candidates).await.records
    }

    /// Resolves `candidates` and reports what happened to each of them.
    pub async fn reconcile(&self, candidates: &CandidateKeySet) -> Reconciliation {
        let mut reconciliation = Reconciliation::default();
        if candidates.is_empty() {
            info!("No candidate issue keys to resolve");
            return reconciliation;
        }

        let limit = self.concurrency.unwrap_or(candidates.len());
        info!(count = candidates.len(), limit, "Resolving candidate issue keys");

        let resolutions: Vec<Resolution> = stream::iter(candidates.iter())
            .map(|key| self.resolve_one(key))
            .buffered(limit)
            .collect()
            .await;

        let mut resolved_keys = HashSet::new();
        for resolution in resolutions {
            match resolution {
                Resolution::Found(record) => {
                    // Two candidates can point at one issue after a move.
                    if resolved_keys.insert(record.key.clone()) {
                        reconciliation.records.push(record);
                    }
                }
                Resolution::NotFound(key) => reconciliation.not_found.push(key),
                Resolution::Failed(failed) => reconciliation.failed.push(failed),
            }
        }

        info!(
            resolved = reconciliation.records.len(),
            not_found = reconciliation.not_found.len(),
            failed = reconciliation.failed.len(),
            "Reconciliation complete"
        );
        reconciliation
    }

    async fn resolve_one(&self, key: &IssueKey) -> Resolution {
        let span = info_span!("fetch_issue", key = %key);

        async {
            match self.fetcher.fetch_issue(key).await {
                Ok(Some(record)) => {
                    if record.key != *key {
                        warn!(resolved = %record.key, "Issue key resolved to a different issue");
                    }
                    debug!("Issue found");
                    Resolution::Found(apply_fix_version_override(
                        record,
                        self.fix_versions.as_ref(),
                    ))
                }
                Ok(None) => {
                    debug!("Not an existing issue, dropping");
                    Resolution::NotFound(key.clone())
                }
                Err(e) => {
                    error!(error = %e, "Failed to fetch issue, dropping");
                    Resolution::Failed(FailedFetch {
                        key: key.clone(),
                        error: e.to_string(),
                    })
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyPattern;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    fn key(raw: &str) -> IssueKey {
        IssueKey::parse(raw, KeyPattern::Loose).unwrap()
    }

    fn candidates(keys: &[&str]) -> CandidateKeySet {
        keys.iter().map(|k| key(k)).collect()
    }

    /// In-memory tracker. Later keys answer first so completion order differs
    /// from candidate order.
    #[derive(Default)]
    struct FakeTracker {
        issues: HashMap<IssueKey, IssueRecord>,
        failing: HashSet<IssueKey>,
        calls: Mutex<Vec<IssueKey>>,
    }

    impl FakeTracker {
        fn with_issue(mut self, raw: &str, versions: &[&str]) -> Self {
            let record = IssueRecord::new(key(raw), format!("Summary of {raw}"))
                .with_fix_versions(versions.iter().copied());
            self.issues.insert(key(raw), record);
            self
        }

        fn with_failure(mut self, raw: &str) -> Self {
            self.failing.insert(key(raw));
            self
        }

        fn calls(&self) -> Vec<IssueKey> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IssueFetcher for FakeTracker {
        async fn fetch_issue(&self, key: &IssueKey) -> Result<Option<IssueRecord>, FetchError> {
            let delay = 40u64.saturating_sub(self.calls.lock().unwrap().len() as u64 * 10);
            self.calls.lock().unwrap().push(key.clone());
            tokio::time::sleep(Duration::from_millis(delay)).await;

            if self.failing.contains(key) {
                return Err(FetchError::Other(format!("connection reset for {key}")));
            }
            Ok(self.issues.get(key).cloned())
        }
    }

    fn sorted_keys(records: &[IssueRecord]) -> Vec<String> {
        let mut keys: Vec<String> = records.iter().map(|r| r.key.to_string()).collect();
        keys.sort();
        keys
    }

    #[tokio::test]
    async fn returns_only_existing_issues() {
        let tracker = FakeTracker::default()
            .with_issue("ABC-1", &[])
            .with_issue("ABC-3", &[]);
        let reconciler = IssueReconciler::new(tracker);

        let reconciliation = reconciler
            .reconcile(&candidates(&["ABC-1", "ABC-2", "ABC-3", "ABC-4"]))
            .await;

        assert_eq!(sorted_keys(&reconciliation.records), ["ABC-1", "ABC-3"]);
        assert_eq!(reconciliation.not_found.len(), 2);
        assert!(reconciliation.failed.is_empty());
    }

    #[tokio::test]
    async fn fetches_each_candidate_once() {
        let reconciler = IssueReconciler::new(FakeTracker::default().with_issue("ABC-1", &[]));

        reconciler
            .resolve(&candidates(&["abc-1", "ABC-1", "XYZ-9"]))
            .await;

        let mut calls: Vec<String> = reconciler
            .fetcher()
            .calls()
            .iter()
            .map(ToString::to_string)
            .collect();
        calls.sort();
        assert_eq!(calls, ["ABC-1", "XYZ-9"]);
    }

    #[tokio::test]
    async fn failed_fetch_does_not_abort_batch() {
        let tracker = FakeTracker::default()
            .with_issue("ABC-1", &[])
            .with_issue("ABC-2", &[])
            .with_failure("ABC-2")
            .with_issue("ABC-3", &[]);
        let reconciler = IssueReconciler::new(tracker);

        let reconciliation = reconciler
            .reconcile(&candidates(&["ABC-1", "ABC-2", "ABC-3"]))
            .await;

        assert_eq!(sorted_keys(&reconciliation.records), ["ABC-1", "ABC-3"]);
        assert_eq!(reconciliation.failed.len(), 1);
        assert_eq!(reconciliation.failed[0].key, key("ABC-2"));
    }

    #[tokio::test]
    async fn output_order_is_stable() {
        let tracker = Arc::new(
            FakeTracker::default()
                .with_issue("A-1", &[])
                .with_issue("B-2", &[])
                .with_issue("C-3", &[]),
        );
        let set = candidates(&["C-3", "A-1", "B-2"]);

        let first = IssueReconciler::new(tracker.clone()).resolve(&set).await;
        let second = IssueReconciler::new(tracker).resolve(&set).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn applies_fix_version_override_to_each_record() {
        let tracker = FakeTracker::default()
            .with_issue("ABC-1", &["1.0"])
            .with_issue("ABC-2", &[]);
        let reconciler = IssueReconciler::new(tracker)
            .with_fix_version_override(FixVersionOverride::from_list("2.0", FixVersionMode::Additive))
            .with_concurrency(1);

        let mut records = reconciler.resolve(&candidates(&["ABC-1", "ABC-2"])).await;
        records.sort_by(|a, b| a.key.cmp(&b.key));

        assert_eq!(records[0].fix_versions, ["1.0", "2.0"]);
        assert_eq!(records[1].fix_versions, ["2.0"]);
    }

    /// Tracker that records the most lookups it saw in flight at once.
    #[derive(Default)]
    struct InFlightTracker {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl IssueFetcher for InFlightTracker {
        async fn fetch_issue(&self, key: &IssueKey) -> Result<Option<IssueRecord>, FetchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(IssueRecord::new(key.clone(), "Summary")))
        }
    }

    #[tokio::test]
    async fn issues_every_lookup_at_once_by_default() {
        let set = candidates(&["A-1", "B-2", "C-3", "D-4", "E-5", "F-6"]);
        let reconciler = IssueReconciler::new(InFlightTracker::default());

        let records = reconciler.resolve(&set).await;

        assert_eq!(records.len(), 6);
        assert_eq!(reconciler.fetcher().peak.load(Ordering::SeqCst), 6);
        assert_eq!(reconciler.fetcher().in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrency_limit_caps_lookups_in_flight() {
        let set = candidates(&["A-1", "B-2", "C-3", "D-4", "E-5", "F-6"]);
        let reconciler = IssueReconciler::new(InFlightTracker::default()).with_concurrency(2);

        let records = reconciler.resolve(&set).await;

        assert_eq!(records.len(), 6);
        assert_eq!(reconciler.fetcher().peak.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_candidate_set_is_not_an_error() {
        let reconciler = IssueReconciler::new(FakeTracker::default());
        let reconciliation = reconciler.reconcile(&CandidateKeySet::new()).await;

        assert!(reconciliation.records.is_empty());
        assert!(reconciler.fetcher().calls().is_empty());
    }
}

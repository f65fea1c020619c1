//! Moving issues through a Jira workflow.

use super::{JiraClient, JiraError, Transition};
use crate::reconcile::IssueRecord;
use serde::Serialize;
use tracing::{debug, info, info_span, warn, Instrument};

/// The workflow steps to walk an issue through to reach a target transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    steps: Vec<String>,
}

impl TransitionPlan {
    /// Plans the path to `target` along `chain`.
    ///
    /// The steps are the chain entries up to and including the target. A
    /// target that is not part of the chain is applied on its own.
    #[must_use]
    pub fn new(chain: &[String], target: &str) -> Self {
        let target = target.trim();
        let steps = match chain
            .iter()
            .position(|step| step.trim().eq_ignore_ascii_case(target))
        {
            Some(index) => chain[..=index]
                .iter()
                .map(|step| step.trim().to_string())
                .collect(),
            None => vec![target.to_string()],
        };
        Self { steps }
    }

    /// Plans from a comma separated chain such as `"Start Progress, Review, Done"`.
    #[must_use]
    pub fn from_chain_str(chain: Option<&str>, target: &str) -> Self {
        let chain: Vec<String> = chain
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|step| !step.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(&chain, target)
    }

    #[must_use]
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Returns the final step.
    #[must_use]
    pub fn target(&self) -> &str {
        self.steps.last().map_or("", String::as_str)
    }
}

/// Finds the transition matching `step` by id, or by name ignoring case.
#[must_use]
pub fn find_transition<'a>(available: &'a [Transition], step: &str) -> Option<&'a Transition> {
    let step = step.trim();
    available
        .iter()
        .find(|t| t.id == step)
        .or_else(|| available.iter().find(|t| t.name.eq_ignore_ascii_case(step)))
}

/// Outcome of walking one issue through a [`TransitionPlan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransitionStatus {
    /// At least one step was applied.
    Applied {
        /// Names of the transitions applied, in order.
        steps: Vec<String>,
        /// Status reported by Jira afterwards.
        status: Option<String>,
    },

    /// No step was available, so the issue was left alone.
    Unchanged,

    /// A Jira call failed part way.
    Failed {
        /// Error message.
        error: String,
    },
}

impl TransitionStatus {
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Walks `record` through `plan`, updating its status from Jira afterwards.
///
/// Steps not currently available are skipped. Errors are reported in the
/// returned status rather than propagated.
pub async fn apply_transition_plan(
    client: &JiraClient,
    record: &mut IssueRecord,
    plan: &TransitionPlan,
) -> TransitionStatus {
    let span = info_span!("transition_issue", key = %record.key, transition = plan.target());
    async {
        match walk_plan(client, record, plan).await {
            Ok(status) => status,
            Err(e) => {
                warn!(key = %record.key, error = %e, "Failed to transition issue");
                TransitionStatus::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
    .instrument(span)
    .await
}

async fn walk_plan(
    client: &JiraClient,
    record: &mut IssueRecord,
    plan: &TransitionPlan,
) -> Result<TransitionStatus, JiraError> {
    let mut applied = Vec::new();

    for step in plan.steps() {
        let available = client.get_transitions(&record.key).await?;
        let Some(transition) = find_transition(&available, step) else {
            debug!(key = %record.key, step = %step, "Transition not available, skipping");
            continue;
        };

        client.transition_issue(&record.key, &transition.id).await?;
        info!(key = %record.key, transition = %transition.name, "Applied transition");
        applied.push(transition.name.clone());
    }

    if applied.is_empty() {
        return Ok(TransitionStatus::Unchanged);
    }

    if let Some(issue) = client.get_issue(&record.key).await? {
        record.status = issue.fields.status.map(|s| s.name);
    }

    Ok(TransitionStatus::Applied {
        steps: applied,
        status: record.status.clone(),
    })
}

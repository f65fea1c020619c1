//! Choosing a Jira transition from the triggering event.

use super::EventContext;

/// Transitions to apply for each kind of event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTriggers {
    /// Applied when no event specific transition matches.
    pub default: Option<String>,
    pub on_pr_open: Option<String>,
    pub on_pr_approval: Option<String>,
    pub on_pr_merge: Option<String>,
    pub on_new_branch: Option<String>,
}

impl TransitionTriggers {
    /// Returns the transition for `event`, if any.
    #[must_use]
    pub fn select(&self, event: &EventContext) -> Option<&str> {
        let payload = &event.payload;
        let action = payload.action.as_deref();

        let specific = if event.is("pull_request") {
            let merged = payload.pull_request.as_ref().is_some_and(|pr| pr.merged);
            match action {
                Some("closed") if merged => self.on_pr_merge.as_deref(),
                Some("opened") => self.on_pr_open.as_deref(),
                _ => None,
            }
        } else if event.is("pull_request_review") {
            let approved = payload
                .review
                .as_ref()
                .and_then(|review| review.state.as_deref())
                .is_some_and(|state| state.eq_ignore_ascii_case("approved"));
            if approved {
                self.on_pr_approval.as_deref()
            } else {
                None
            }
        } else if event.is("create") {
            self.on_new_branch.as_deref()
        } else {
            None
        };

        specific
            .or(self.default.as_deref())
            .map(str::trim)
            .filter(|transition| !transition.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triggers() -> TransitionTriggers {
        TransitionTriggers {
            default: Some("In Progress".to_string()),
            on_pr_open: Some("Code Review".to_string()),
            on_pr_approval: Some("Approved".to_string()),
            on_pr_merge: Some("Done".to_string()),
            on_new_branch: Some("Start Progress".to_string()),
        }
    }

    fn event(name: &str, payload: serde_json::Value) -> EventContext {
        EventContext {
            name: Some(name.to_string()),
            payload: serde_json::from_value(payload).unwrap(),
        }
    }

    fn pull_request(action: &str, merged: bool) -> EventContext {
        event(
            "pull_request",
            serde_json::json!({
                "action": action,
                "pull_request": { "number": 1, "merged": merged }
            }),
        )
    }

    #[test]
    fn merged_pull_request_uses_merge_transition() {
        assert_eq!(triggers().select(&pull_request("closed", true)), Some("Done"));
    }

    #[test]
    fn closed_without_merge_falls_back_to_default() {
        assert_eq!(
            triggers().select(&pull_request("closed", false)),
            Some("In Progress")
        );
    }

    #[test]
    fn opened_pull_request_uses_open_transition() {
        assert_eq!(
            triggers().select(&pull_request("opened", false)),
            Some("Code Review")
        );
    }

    #[test]
    fn approved_review_uses_approval_transition() {
        let approved = event(
            "pull_request_review",
            serde_json::json!({ "action": "submitted", "review": { "state": "APPROVED" } }),
        );
        let commented = event(
            "pull_request_review",
            serde_json::json!({ "action": "submitted", "review": { "state": "commented" } }),
        );

        assert_eq!(triggers().select(&approved), Some("Approved"));
        assert_eq!(triggers().select(&commented), Some("In Progress"));
    }

    #[test]
    fn new_branch_uses_branch_transition() {
        let create = event("create", serde_json::json!({ "ref": "ABC-1-work" }));
        assert_eq!(triggers().select(&create), Some("Start Progress"));
    }

    #[test]
    fn nothing_configured_means_no_transition() {
        let push = event("push", serde_json::json!({}));
        assert_eq!(TransitionTriggers::default().select(&push), None);

        let blank = TransitionTriggers {
            default: Some("  ".to_string()),
            ..TransitionTriggers::default()
        };
        assert_eq!(blank.select(&push), None);
    }
}

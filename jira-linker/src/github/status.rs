//! GitHub mutation status types.

use serde::Serialize;

/// Status of mirroring a Jira issue to a GitHub issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MirrorStatus {
    /// A new GitHub issue was opened.
    Created {
        /// GitHub issue number.
        number: u64,
        /// GitHub issue URL.
        url: String,
    },

    /// An existing GitHub issue was updated.
    Updated {
        /// GitHub issue number.
        number: u64,
        /// GitHub issue URL.
        url: String,
    },

    /// Mirroring skipped.
    Skipped {
        /// Reason for skipping.
        reason: String,
    },

    /// Mirroring failed.
    Failed {
        /// Error message.
        error: String,
    },
}

impl MirrorStatus {
    /// Returns the status as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }

    /// Returns the GitHub issue number, if one exists.
    #[must_use]
    pub fn number(&self) -> Option<u64> {
        match self {
            Self::Created { number, .. } | Self::Updated { number, .. } => Some(*number),
            _ => None,
        }
    }
}

/// Status of updating the pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PrUpdateStatus {
    /// No pull request was in scope.
    #[default]
    NotApplicable,

    /// Title and/or body were updated.
    Updated {
        /// Pull request number.
        number: u64,
        /// Whether the title was rewritten.
        title_changed: bool,
    },

    /// Update skipped.
    Skipped {
        /// Reason for skipping.
        reason: String,
    },

    /// Update failed.
    Failed {
        /// Error message.
        error: String,
    },
}

impl PrUpdateStatus {
    /// Returns the status as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotApplicable => "not_applicable",
            Self::Updated { .. } => "updated",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_mirror_status_to_string() {
        let created = MirrorStatus::Created {
            number: 7,
            url: "https://github.com/o/r/issues/7".to_string(),
        };
        assert_eq!(created.as_str(), "created");
        assert_eq!(created.number(), Some(7));

        let failed = MirrorStatus::Failed {
            error: "boom".to_string(),
        };
        assert_eq!(failed.as_str(), "failed");
        assert_eq!(failed.number(), None);
    }

    #[test]
    fn serializes_pr_update_status_with_tag() {
        let status = PrUpdateStatus::Updated {
            number: 3,
            title_changed: true,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "updated");
        assert_eq!(json["title_changed"], true);
        assert_eq!(PrUpdateStatus::default().as_str(), "not_applicable");
    }
}

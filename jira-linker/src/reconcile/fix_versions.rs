//! Caller-supplied fix version overrides.

use super::IssueRecord;
use std::collections::HashSet;

/// Value that clears every fix version instead of listing new ones.
const CLEAR_SENTINEL: &str = "NONE";

/// How a supplied fix version list combines with the issue's own. Has no
/// default; callers choose one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixVersionMode {
    /// Discard the issue's fix versions and use the supplied list.
    Replace,
    /// Keep the issue's fix versions and add the supplied ones.
    Additive,
}

/// A fix version directive applied to every resolved issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixVersionOverride {
    /// Remove all fix versions.
    Clear,
    /// Use exactly these versions.
    Replace(Vec<String>),
    /// Union these versions into the existing ones.
    Additive(Vec<String>),
}

impl FixVersionOverride {
    /// Builds an override from a comma-delimited list.
    ///
    /// Returns `None` for an empty list. The value `none` (any case) yields
    /// [`FixVersionOverride::Clear`] regardless of `mode`.
    #[must_use]
    pub fn from_list(raw: &str, mode: FixVersionMode) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case(CLEAR_SENTINEL) {
            return Some(Self::Clear);
        }

        let versions = normalize(raw.split(','));
        if versions.is_empty() {
            return None;
        }

        Some(match mode {
            FixVersionMode::Replace => Self::Replace(versions),
            FixVersionMode::Additive => Self::Additive(versions),
        })
    }
}

/// Applies `fix_versions` to `issue`. Without an override the issue is
/// returned unchanged.
#[must_use]
pub fn apply_fix_version_override(
    mut issue: IssueRecord,
    fix_versions: Option<&FixVersionOverride>,
) -> IssueRecord {
    match fix_versions {
        None => {}
        Some(FixVersionOverride::Clear) => issue.fix_versions.clear(),
        Some(FixVersionOverride::Replace(versions)) => {
            issue.fix_versions = normalize(versions);
        }
        Some(FixVersionOverride::Additive(versions)) => {
            let existing = std::mem::take(&mut issue.fix_versions);
            issue.fix_versions = normalize(existing.iter().chain(versions));
        }
    }
    issue
}

/// Trims, drops empty entries and removes duplicates, keeping first-seen order.
fn normalize<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter_map(|value| {
            let value = value.as_ref().trim();
            (!value.is_empty() && seen.insert(value.to_string())).then(|| value.to_string())
        })
        .collect()
}

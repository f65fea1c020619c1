//! Ordered, deduplicated set of candidate issue keys.

use super::IssueKey;
use std::collections::HashSet;

/// Candidate issue keys in order of first appearance.
///
/// Equality ignores order: two sets are equal when they hold the same keys.
/// The order only matters for reporting.
#[derive(Debug, Clone, Default)]
pub struct CandidateKeySet {
    keys: Vec<IssueKey>,
    seen: HashSet<IssueKey>,
}

impl CandidateKeySet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key, returning `false` if it was already present.
    pub fn insert(&mut self, key: IssueKey) -> bool {
        if self.seen.contains(&key) {
            return false;
        }
        self.seen.insert(key.clone());
        self.keys.push(key);
        true
    }

    /// Adds every key of `other` that is not already present.
    pub fn union_with(&mut self, other: &Self) {
        for key in &other.keys {
            self.insert(key.clone());
        }
    }

    #[must_use]
    pub fn contains(&self, key: &IssueKey) -> bool {
        self.seen.contains(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterates keys in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, IssueKey> {
        self.keys.iter()
    }

    /// Joins the keys with commas, in insertion order.
    #[must_use]
    pub fn to_comma_delimited(&self) -> String {
        self.keys
            .iter()
            .map(IssueKey::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl PartialEq for CandidateKeySet {
    fn eq(&self, other: &Self) -> bool {
        self.seen == other.seen
    }
}

impl Eq for CandidateKeySet {}

impl Extend<IssueKey> for CandidateKeySet {
    fn extend<I: IntoIterator<Item = IssueKey>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl FromIterator<IssueKey> for CandidateKeySet {
    fn from_iter<I: IntoIterator<Item = IssueKey>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl IntoIterator for CandidateKeySet {
    type Item = IssueKey;
    type IntoIter = std::vec::IntoIter<IssueKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

impl<'a> IntoIterator for &'a CandidateKeySet {
    type Item = &'a IssueKey;
    type IntoIter = std::slice::Iter<'a, IssueKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

//! Issue keys and the patterns that recognise them.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// Widest token shape either pattern can accept: `PROJECT-NUMBER`.
static KEY_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9]+-[0-9]+").expect("issue key regex is valid"));

/// Allowed project prefix length in strict mode.
const STRICT_PREFIX_LEN: std::ops::RangeInclusive<usize> = 2..=8;

/// Allowed number of digits in strict mode.
const STRICT_DIGITS_LEN: std::ops::RangeInclusive<usize> = 3..=5;

/// Which token shapes count as issue keys.
///
/// [`KeyPattern::Strict`] is the CLI default. It rejects tokens such as
/// `v1-2` or `build-20240101` that the loose pattern would report.
/// [`KeyPattern::Loose`] accepts any `[A-Za-z0-9]+-[0-9]+` token and is kept for
/// repositories that relied on the legacy matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyPattern {
    /// Prefix of 2-8 alphanumerics, 3-5 digit number.
    Strict,
    /// Any alphanumeric prefix, any number of digits.
    Loose,
}

impl KeyPattern {
    /// Returns every key found in `text`, normalized, in order of appearance.
    ///
    /// Duplicates are not removed here; collect into a
    /// [`CandidateKeySet`](super::CandidateKeySet) for that.
    pub fn find_keys<'t>(self, text: &'t str) -> impl Iterator<Item = IssueKey> + 't {
        KEY_TOKEN
            .find_iter(text)
            .filter_map(move |token| IssueKey::from_token(token.as_str(), self))
    }

    fn accepts(self, prefix: &str, digits: &str) -> bool {
        match self {
            Self::Loose => true,
            Self::Strict => {
                STRICT_PREFIX_LEN.contains(&prefix.len())
                    && STRICT_DIGITS_LEN.contains(&digits.len())
            }
        }
    }

    /// Returns the pattern name as used on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Loose => "loose",
        }
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "loose" => Ok(Self::Loose),
            other => Err(format!("unknown key pattern '{other}', expected 'strict' or 'loose'")),
        }
    }
}

/// A normalized Jira issue key such as `ABC-123`.
///
/// Keys are trimmed and upper-cased on construction, so `abc-123` and
/// `ABC-123` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct IssueKey(String);

impl IssueKey {
    /// Parses a single key, accepting it only if the whole (trimmed) input is
    /// a key under `pattern`.
    #[must_use]
    pub fn parse(raw: &str, pattern: KeyPattern) -> Option<Self> {
        Self::from_token(raw.trim(), pattern)
    }

    fn from_token(token: &str, pattern: KeyPattern) -> Option<Self> {
        let (prefix, digits) = token.split_once('-')?;
        let well_formed = !prefix.is_empty()
            && !digits.is_empty()
            && prefix.bytes().all(|b| b.is_ascii_alphanumeric())
            && digits.bytes().all(|b| b.is_ascii_digit());

        if !well_formed || !pattern.accepts(prefix, digits) {
            return None;
        }
        Some(Self(token.to_ascii_uppercase()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the project part of the key (`ABC` for `ABC-123`).
    #[must_use]
    pub fn project(&self) -> &str {
        self.0.split_once('-').map_or(self.0.as_str(), |(p, _)| p)
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IssueKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<IssueKey> for String {
    fn from(key: IssueKey) -> Self {
        key.0
    }
}

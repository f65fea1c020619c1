//! GitHub core API rate limiting.
//!
//! Mutations check the remaining core quota first and sleep until the
//! window resets when it runs low.

use octocrab::Octocrab;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

/// Maximum time to wait for rate limit reset (15 minutes).
const MAX_WAIT_SECS: u64 = 900;

/// Minimum remaining requests before proactively waiting.
const MIN_REMAINING_THRESHOLD: u32 = 5;

/// Core API quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// Requests remaining in the current window.
    pub remaining: u32,
    /// Unix timestamp when the rate limit resets.
    pub reset: u64,
}

impl RateLimitInfo {
    /// How long to wait at time `now` (Unix seconds), if at all.
    #[must_use]
    pub fn wait_at(&self, now: u64) -> Option<Duration> {
        if self.remaining >= MIN_REMAINING_THRESHOLD || self.reset <= now {
            return None;
        }

        let wait_secs = self.reset - now;
        if wait_secs > MAX_WAIT_SECS {
            warn!(
                wait_secs,
                max_wait = MAX_WAIT_SECS,
                "Rate limit reset too far in future, capping wait time"
            );
        }
        Some(Duration::from_secs(wait_secs.min(MAX_WAIT_SECS)))
    }
}

/// Reads the core API quota.
///
/// # Errors
///
/// Returns an error if the rate limit API call fails.
pub async fn check_core_rate_limit(octocrab: &Octocrab) -> Result<RateLimitInfo, octocrab::Error> {
    let rate_limit = octocrab.ratelimit().get().await?;
    let core = &rate_limit.resources.core;

    Ok(RateLimitInfo {
        remaining: u32::try_from(core.remaining).unwrap_or(u32::MAX),
        reset: core.reset,
    })
}

/// Waits if the quota is low, returning true if we waited.
pub async fn wait_if_needed(info: &RateLimitInfo) -> bool {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let Some(wait) = info.wait_at(now) else {
        return false;
    };

    info!(
        remaining = info.remaining,
        wait_secs = wait.as_secs(),
        "Rate limit low, waiting for reset"
    );
    tokio::time::sleep(wait).await;
    true
}

/// Ensures sufficient rate limit before making core API calls.
///
/// # Errors
///
/// Returns an error if the rate limit check fails.
pub async fn ensure_core_rate_limit(octocrab: &Octocrab) -> Result<(), octocrab::Error> {
    let info = check_core_rate_limit(octocrab).await?;
    wait_if_needed(&info).await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_wait_with_quota_left() {
        let info = RateLimitInfo {
            remaining: 100,
            reset: 2_000,
        };
        assert_eq!(info.wait_at(1_000), None);
    }

    #[test]
    fn no_wait_once_reset_passed() {
        let info = RateLimitInfo {
            remaining: 1,
            reset: 1_000,
        };
        assert_eq!(info.wait_at(1_500), None);
    }

    #[test]
    fn waits_until_reset_when_low() {
        let info = RateLimitInfo {
            remaining: 1,
            reset: 1_060,
        };
        assert_eq!(info.wait_at(1_000), Some(Duration::from_secs(60)));
    }

    #[test]
    fn caps_long_waits() {
        let info = RateLimitInfo {
            remaining: 0,
            reset: 100_000,
        };
        assert_eq!(
            info.wait_at(0),
            Some(Duration::from_secs(MAX_WAIT_SECS))
        );
    }

    #[tokio::test]
    async fn wait_if_needed_returns_immediately_with_quota() {
        let info = RateLimitInfo {
            remaining: 100,
            reset: 0,
        };
        assert!(!wait_if_needed(&info).await);
    }
}

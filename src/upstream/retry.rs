//! Bounded retry policy for per-symbol fetches.
//!
//! The policy is pure: it decides whether another attempt is allowed and what
//! delay precedes it, but never sleeps. Sleeping happens in the client, which
//! keeps the policy unit-testable without real time passing.
//!
//! Unlike a broker order path, the upstream here rate-limits politely rather
//! than hard-failing, so the delay is a fixed courtesy pause instead of an
//! exponential backoff.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retry configuration for one symbol fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts per symbol (default: 3).
    pub max_attempts: u32,
    /// Timeout applied to each individual attempt (default: 10s).
    pub attempt_timeout: Duration,
    /// Fixed pause between attempts (default: 500ms).
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(10),
            retry_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Track attempts for a single fetch.
    #[must_use]
    pub const fn attempts(&self) -> AttemptTracker<'_> {
        AttemptTracker {
            policy: self,
            used: 0,
        }
    }
}

/// Per-fetch attempt counter over a [`RetryPolicy`].
#[derive(Debug)]
pub struct AttemptTracker<'a> {
    policy: &'a RetryPolicy,
    used: u32,
}

impl AttemptTracker<'_> {
    /// Consume one attempt. Returns the attempt number (1-based), or `None`
    /// when the budget is exhausted.
    pub const fn start_attempt(&mut self) -> Option<u32> {
        if self.used >= self.policy.max_attempts {
            return None;
        }
        self.used += 1;
        Some(self.used)
    }

    /// Delay to impose before the next attempt, or `None` when no attempts
    /// remain and the caller should give up.
    #[must_use]
    pub const fn next_delay(&self) -> Option<Duration> {
        if self.used >= self.policy.max_attempts {
            None
        } else {
            Some(self.policy.retry_delay)
        }
    }

    /// Number of attempts consumed so far.
    #[must_use]
    pub const fn used(&self) -> u32 {
        self.used
    }
}

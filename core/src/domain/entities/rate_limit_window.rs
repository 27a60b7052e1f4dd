//! Fixed rate-limit window entity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of asking a rate limiter to admit one issuance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateLimitDecision {
    /// Admitted; `remaining` more issuances fit in the current window
    Admitted { remaining: u32 },
    /// Rejected until the window resets
    Rejected { retry_after_seconds: u64 },
}

impl RateLimitDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, RateLimitDecision::Admitted { .. })
    }
}

/// Admission counter for one requester over one window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitWindow {
    /// Requester the window belongs to (email or client address)
    pub requester_key: String,

    /// Issuances admitted since `window_start`
    pub count: u32,

    pub window_start: DateTime<Utc>,

    pub window_duration: Duration,
}

impl RateLimitWindow {
    /// Open an empty window starting at `now`
    pub fn new(requester_key: impl Into<String>, now: DateTime<Utc>, window_duration: Duration) -> Self {
        Self {
            requester_key: requester_key.into(),
            count: 0,
            window_start: now,
            window_duration,
        }
    }

    pub fn window_end(&self) -> DateTime<Utc> {
        self.window_start + self.window_duration
    }

    /// Whether the window is over and its count no longer applies
    pub fn is_elapsed(&self, now: DateTime<Utc>) -> bool {
        now >= self.window_end()
    }

    /// Admit one issuance if the quota allows it
    ///
    /// An elapsed window is restarted at `now` before counting. Rejections do
    /// not increment the counter.
    pub fn consume(&mut self, now: DateTime<Utc>, quota: u32) -> RateLimitDecision {
        if self.is_elapsed(now) {
            self.window_start = now;
            self.count = 0;
        }

        if self.count < quota {
            self.count += 1;
            RateLimitDecision::Admitted {
                remaining: quota - self.count,
            }
        } else {
            RateLimitDecision::Rejected {
                retry_after_seconds: seconds_until(now, self.window_end()),
            }
        }
    }
}

/// Whole seconds from `now` until `until`, rounded up, never below one
pub fn seconds_until(now: DateTime<Utc>, until: DateTime<Utc>) -> u64 {
    let millis = (until - now).num_milliseconds();
    if millis <= 0 {
        1
    } else {
        ((millis + 999) / 1000).max(1) as u64
    }
}

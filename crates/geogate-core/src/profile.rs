//! User profile model
//!
//! One row per authenticated user. The profile itself is created by the
//! auth system's signup trigger; this crate only mutates counters and plan.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Analyses allowed per window on the free plan
pub const FREE_ANALYSES_PER_WINDOW: i32 = 5;

/// Rewrites allowed per window on the pro plan
pub const PRO_REWRITES_PER_WINDOW: i32 = 30;

/// Length of the usage window in days
pub const USAGE_WINDOW_DAYS: i64 = 30;

/// Display-only "remaining" value for unlimited pro analyses
pub const UNLIMITED_REMAINING: i32 = 999_999;

/// Subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Default tier: 5 analyses per window, no rewrites
    Free,
    /// Paid tier: unlimited analyses, 30 rewrites per window
    Pro,
}

impl Plan {
    /// Storage representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
        }
    }

    /// Parse the storage representation
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "free" => Ok(Plan::Free),
            "pro" => Ok(Plan::Pro),
            other => Err(Error::Database(format!("unknown plan value: {other}"))),
        }
    }
}

/// Per-user plan and usage state
#[derive(Debug, Clone)]
pub struct Profile {
    /// Identity key, equals the auth subject
    pub id: Uuid,
    /// Email recorded at signup, used for billing fallback lookups
    pub email: Option<String>,
    /// Current subscription tier
    pub plan: Plan,
    /// Analyses performed in the current window
    pub analyses_count: i32,
    /// Rewrites performed in the current window
    pub rewrites_count: i32,
    /// End of the current 30-day usage window
    pub reset_date: DateTime<Utc>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Whether the usage window has elapsed (strictly after `reset_date`)
    #[must_use]
    pub fn window_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.reset_date
    }

    /// Analyses count as seen after the lazy window reset
    #[must_use]
    pub fn effective_analyses(&self, now: DateTime<Utc>) -> i32 {
        if self.window_expired(now) {
            0
        } else {
            self.analyses_count
        }
    }

    /// Rewrites count as seen after the lazy window reset
    #[must_use]
    pub fn effective_rewrites(&self, now: DateTime<Utc>) -> i32 {
        if self.window_expired(now) {
            0
        } else {
            self.rewrites_count
        }
    }
}

/// End of the window that starts now
#[must_use]
pub fn next_reset(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::days(USAGE_WINDOW_DAYS)
}

//! Quota evaluation
//!
//! Pure allow/deny decisions over a profile snapshot. Handlers use this as
//! the fast-path pre-check; the authoritative gate is the store's atomic
//! conditional reservation, which applies the same conditions in a single
//! UPDATE statement.

use chrono::{DateTime, Utc};

use crate::profile::{
    Plan, Profile, FREE_ANALYSES_PER_WINDOW, PRO_REWRITES_PER_WINDOW, UNLIMITED_REMAINING,
};

/// Message returned when the free analyze quota is spent
pub const FREE_LIMIT_MESSAGE: &str =
    "Free plan limit reached. Upgrade to Pro for unlimited analyses.";

/// Message returned when rewrite is requested without a pro plan
pub const REWRITE_PLAN_MESSAGE: &str = "Upgrade to Pro to unlock rewrites";

/// Outcome of a quota check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaDecision {
    /// Action permitted; `remaining` is what would be left after taking it
    Allowed {
        /// Uses left in the window after this action
        remaining: i32,
    },
    /// Denied: plan does not cover the action (or free quota is spent)
    UpgradeRequired,
    /// Denied: the plan covers the action but the window limit is reached
    LimitReached {
        /// End of the current usage window, for the error message
        reset_date: DateTime<Utc>,
    },
}

/// Decide whether an analyze action is permitted.
#[must_use]
pub fn evaluate_analyze(profile: &Profile, now: DateTime<Utc>) -> QuotaDecision {
    match profile.plan {
        Plan::Pro => QuotaDecision::Allowed {
            remaining: UNLIMITED_REMAINING,
        },
        Plan::Free => {
            let used = profile.effective_analyses(now);
            if used < FREE_ANALYSES_PER_WINDOW {
                QuotaDecision::Allowed {
                    remaining: FREE_ANALYSES_PER_WINDOW - used - 1,
                }
            } else {
                QuotaDecision::UpgradeRequired
            }
        }
    }
}

/// Decide whether a rewrite action is permitted.
#[must_use]
pub fn evaluate_rewrite(profile: &Profile, now: DateTime<Utc>) -> QuotaDecision {
    if profile.plan != Plan::Pro {
        return QuotaDecision::UpgradeRequired;
    }

    let used = profile.effective_rewrites(now);
    if used < PRO_REWRITES_PER_WINDOW {
        QuotaDecision::Allowed {
            remaining: PRO_REWRITES_PER_WINDOW - used - 1,
        }
    } else {
        QuotaDecision::LimitReached {
            reset_date: profile.reset_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn profile(plan: Plan, analyses: i32, rewrites: i32, reset: DateTime<Utc>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: None,
            plan,
            analyses_count: analyses,
            rewrites_count: rewrites,
            reset_date: reset,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_sixth_free_analysis_denied() {
        let now = Utc::now();
        let reset = now + Duration::days(10);

        // Requests 1-5 pass, each with one fewer remaining
        for used in 0..5 {
            let p = profile(Plan::Free, used, 0, reset);
            assert_eq!(
                evaluate_analyze(&p, now),
                QuotaDecision::Allowed {
                    remaining: 5 - used - 1
                },
                "request {} should be allowed",
                used + 1
            );
        }

        // The 6th is denied
        let p = profile(Plan::Free, 5, 0, reset);
        assert_eq!(evaluate_analyze(&p, now), QuotaDecision::UpgradeRequired);
    }

    #[test]
    fn test_pro_analyze_unlimited() {
        let now = Utc::now();
        let p = profile(Plan::Pro, 1_000_000, 0, now + Duration::days(1));
        assert_eq!(
            evaluate_analyze(&p, now),
            QuotaDecision::Allowed {
                remaining: UNLIMITED_REMAINING
            }
        );
    }

    #[test]
    fn test_expired_window_counts_as_zero() {
        let now = Utc::now();
        // Quota spent, but the window elapsed an hour ago
        let p = profile(Plan::Free, 5, 0, now - Duration::hours(1));
        assert_eq!(
            evaluate_analyze(&p, now),
            QuotaDecision::Allowed { remaining: 4 }
        );

        let p = profile(Plan::Pro, 0, 30, now - Duration::hours(1));
        assert_eq!(
            evaluate_rewrite(&p, now),
            QuotaDecision::Allowed { remaining: 29 }
        );
    }

    #[test]
    fn test_rewrite_requires_pro() {
        let now = Utc::now();
        let p = profile(Plan::Free, 0, 0, now + Duration::days(1));
        assert_eq!(evaluate_rewrite(&p, now), QuotaDecision::UpgradeRequired);
    }

    #[test]
    fn test_rewrite_thirty_allowed_thirty_one_denied() {
        let now = Utc::now();
        let reset = now + Duration::days(3);

        // 30th request: 29 already used, allowed with zero remaining after it
        let p = profile(Plan::Pro, 0, 29, reset);
        assert_eq!(
            evaluate_rewrite(&p, now),
            QuotaDecision::Allowed { remaining: 0 }
        );

        // 31st request: denied with the window end attached
        let p = profile(Plan::Pro, 0, 30, reset);
        assert_eq!(
            evaluate_rewrite(&p, now),
            QuotaDecision::LimitReached { reset_date: reset }
        );
    }
}

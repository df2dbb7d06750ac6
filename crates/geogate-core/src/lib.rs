//! Geogate Core - Plans, quotas, and billing state
//!
//! This crate holds the one piece of Geogate with real state transitions:
//! - Profile: per-user plan and usage counters with a rolling 30-day window
//! - Quota: allow/deny evaluation for the analyze and rewrite actions
//! - Store: Postgres-backed profile and IP rate-limit stores with atomic
//!   conditional counter updates
//! - Auth: client for the external identity service (token verification,
//!   admin email lookup)
//! - Billing: webhook-driven plan synchronization with the payment provider

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod billing;
pub mod error;
pub mod profile;
pub mod quota;
pub mod store;

pub use auth::{AuthUser, GoTrueClient, IdentityProvider};
pub use billing::{BillingSync, CustomerRef, PlanStore};
pub use error::{Error, Result};
pub use profile::{
    next_reset, Plan, Profile, FREE_ANALYSES_PER_WINDOW, PRO_REWRITES_PER_WINDOW,
    UNLIMITED_REMAINING, USAGE_WINDOW_DAYS,
};
pub use quota::{
    evaluate_analyze, evaluate_rewrite, QuotaDecision, FREE_LIMIT_MESSAGE, REWRITE_PLAN_MESSAGE,
};
pub use store::{
    run_migrations, ProfileStore, RateLimitStore, ANALYZE_ENDPOINT, IP_REQUESTS_PER_DAY,
};

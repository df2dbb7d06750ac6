//! Error types for geogate-core
//!
//! One variant per client-visible failure class, plus internal classes
//! (`Upstream`, `Database`, `Internal`) that all surface to clients as a
//! generic internal error. The HTTP status mapping lives at the handler
//! boundary in the server crate.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Domain error type
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or empty request input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No bearer identity on a sign-in-required action
    #[error("authentication required")]
    AuthRequired,

    /// Missing or invalid bearer identity
    #[error("invalid or missing authentication")]
    Unauthorized,

    /// Authenticated user has no profile row (data-integrity anomaly)
    #[error("user profile not found")]
    ProfileNotFound,

    /// Action requires a higher plan or the free quota is spent
    #[error("{0}")]
    UpgradeRequired(String),

    /// Per-window action limit reached
    #[error("rewrite limit reached, resets {reset_date}")]
    LimitReached {
        /// End of the current usage window
        reset_date: DateTime<Utc>,
    },

    /// Too many requests from one IP within the trailing day
    #[error("too many requests from this IP")]
    RateLimited,

    /// Upstream model call or response-format failure
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// Database failure
    #[error("database error: {0}")]
    Database(String),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Machine-readable error code used in every JSON error body.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::AuthRequired => "auth_required",
            Error::Unauthorized => "unauthorized",
            Error::ProfileNotFound => "profile_not_found",
            Error::UpgradeRequired(_) => "upgrade_required",
            Error::LimitReached { .. } => "limit_reached",
            Error::RateLimited => "rate_limit",
            Error::Upstream(_) | Error::Database(_) | Error::Internal(_) => "internal_error",
        }
    }

    /// Whether the variant's detail must stay out of client responses.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Error::Upstream(_) | Error::Database(_) | Error::Internal(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_cover_client_taxonomy() {
        assert_eq!(Error::InvalidInput("x".into()).code(), "invalid_input");
        assert_eq!(Error::AuthRequired.code(), "auth_required");
        assert_eq!(Error::Unauthorized.code(), "unauthorized");
        assert_eq!(Error::ProfileNotFound.code(), "profile_not_found");
        assert_eq!(Error::UpgradeRequired("x".into()).code(), "upgrade_required");
        assert_eq!(Error::RateLimited.code(), "rate_limit");
        assert_eq!(Error::Upstream("x".into()).code(), "internal_error");
        assert_eq!(Error::Database("x".into()).code(), "internal_error");
    }

    #[test]
    fn test_internal_classes_flagged() {
        assert!(Error::Upstream("boom".into()).is_internal());
        assert!(!Error::RateLimited.is_internal());
    }
}

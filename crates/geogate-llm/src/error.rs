//! Error types for geogate-llm

use thiserror::Error;

/// Gateway error type
#[derive(Debug, Error)]
pub enum Error {
    /// Upstream not configured
    #[error("model not configured: {0}")]
    NotConfigured(String),

    /// Upstream API returned a non-success status
    #[error("api error: {0}")]
    Api(String),

    /// Upstream rate limit exceeded
    #[error("upstream rate limit exceeded")]
    RateLimit,

    /// Response did not match the expected structure
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

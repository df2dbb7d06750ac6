//! HTTP error mapping
//!
//! Converts domain errors into the JSON error envelope
//! `{"error": "<code>", "message": "<human text>"}` with the right status.
//! Internal failure detail is logged server-side and never echoed to the
//! client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use geogate_core::Error;
use serde::Serialize;
use utoipa::ToSchema;

/// JSON error envelope returned by every failing endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code
    pub error: String,
    /// Human-readable message
    pub message: String,
}

/// Response wrapper around the domain error
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<geogate_llm::Error> for ApiError {
    fn from(err: geogate_llm::Error) -> Self {
        Self(Error::Upstream(err.to_string()))
    }
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::AuthRequired | Error::Unauthorized => StatusCode::UNAUTHORIZED,
        Error::ProfileNotFound => StatusCode::NOT_FOUND,
        Error::UpgradeRequired(_) | Error::LimitReached { .. } => StatusCode::FORBIDDEN,
        Error::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        Error::Upstream(_) | Error::Database(_) | Error::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn message_for(err: &Error) -> String {
    match err {
        Error::InvalidInput(msg) | Error::UpgradeRequired(msg) => msg.clone(),
        Error::AuthRequired => "Please sign in to analyze articles".to_string(),
        Error::Unauthorized => "Authentication required".to_string(),
        Error::ProfileNotFound => "User profile not found".to_string(),
        Error::LimitReached { reset_date } => format!(
            "You've used all 30 rewrites this month. Resets on {}",
            reset_date.format("%B %d, %Y")
        ),
        Error::RateLimited => {
            "Too many requests from this IP. Please try again later or upgrade to Pro.".to_string()
        }
        Error::Upstream(_) | Error::Database(_) | Error::Internal(_) => {
            "Something went wrong. Please try again.".to_string()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.0.is_internal() {
            tracing::error!(error = %self.0, code = self.0.code(), "request failed");
        }
        let body = ErrorBody {
            error: self.0.code().to_string(),
            message: message_for(&self.0),
        };
        (status_for(&self.0), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    async fn body_json(err: Error) -> (StatusCode, serde_json::Value) {
        let response = ApiError(err).into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn quota_error_maps_to_403() {
        let (status, body) = body_json(Error::UpgradeRequired(
            geogate_core::FREE_LIMIT_MESSAGE.to_string(),
        ))
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "upgrade_required");
        assert_eq!(
            body["message"],
            "Free plan limit reached. Upgrade to Pro for unlimited analyses."
        );
    }

    #[tokio::test]
    async fn limit_reached_formats_reset_date() {
        let reset = Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap();
        let (status, body) = body_json(Error::LimitReached { reset_date: reset }).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "limit_reached");
        assert_eq!(
            body["message"],
            "You've used all 30 rewrites this month. Resets on March 09, 2025"
        );
    }

    #[tokio::test]
    async fn internal_detail_is_not_echoed() {
        let (status, body) = body_json(Error::Database("connection refused".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "internal_error");
        let message = body["message"].as_str().unwrap();
        assert!(!message.contains("connection refused"));
    }

    #[tokio::test]
    async fn rate_limited_maps_to_429() {
        let (status, body) = body_json(Error::RateLimited).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "rate_limit");
    }

    #[tokio::test]
    async fn auth_variants_differ_in_code() {
        let (_, required) = body_json(Error::AuthRequired).await;
        let (_, unauthorized) = body_json(Error::Unauthorized).await;
        assert_eq!(required["error"], "auth_required");
        assert_eq!(unauthorized["error"], "unauthorized");
    }
}

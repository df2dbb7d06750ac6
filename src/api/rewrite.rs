//! Article rewrite endpoint
//!
//! POST /rewrite — rewrites an article for GEO readiness. Pro plan only,
//! capped per 30-day window.

use crate::api::error::{ApiError, ErrorBody};
use crate::middleware::auth::{AuthRejection, RequireUser};
use axum::{
    extract::rejection::JsonRejection, extract::Extension, routing::post, Json, Router,
};
use chrono::Utc;
use geogate_core::{Error, ProfileStore, QuotaDecision, PRO_REWRITES_PER_WINDOW};
use geogate_llm::{ArticleModel, RewriteResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

/// Request body for POST /rewrite
#[derive(Debug, Deserialize, ToSchema)]
pub struct RewriteRequest {
    /// Article text to rewrite
    pub article: String,
}

/// Response body for POST /rewrite
#[derive(Debug, Serialize, ToSchema)]
pub struct RewriteResponse {
    /// Score of the original article as estimated by the model
    #[serde(rename = "oldScore")]
    pub old_score: u8,
    /// Score of the rewritten article as estimated by the model
    #[serde(rename = "newScore")]
    pub new_score: u8,
    /// The rewritten article
    pub article: String,
    /// What the rewrite changed
    pub improvements: Vec<String>,
    /// Rewrites left in the current window
    #[serde(rename = "rewritesRemaining")]
    pub rewrites_remaining: i32,
}

impl RewriteResponse {
    fn new(result: RewriteResult, rewrites_remaining: i32) -> Self {
        Self {
            old_score: result.old_score,
            new_score: result.new_score,
            article: result.article,
            improvements: result.improvements,
            rewrites_remaining,
        }
    }
}

/// Rewrite an article for GEO readiness
#[utoipa::path(
    post,
    path = "/rewrite",
    tag = "articles",
    request_body = RewriteRequest,
    responses(
        (status = 200, description = "Article rewritten", body = RewriteResponse),
        (status = 400, description = "Missing or empty article", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 403, description = "Plan does not cover rewrites or window limit reached", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn rewrite(
    Extension(profiles): Extension<Arc<ProfileStore>>,
    Extension(model): Extension<Arc<dyn ArticleModel>>,
    user: Result<RequireUser, AuthRejection>,
    body: Result<Json<RewriteRequest>, JsonRejection>,
) -> Result<Json<RewriteResponse>, ApiError> {
    let Json(request) =
        body.map_err(|_| Error::InvalidInput("Article text is required".to_string()))?;
    let article = request.article.trim().to_string();
    if article.is_empty() {
        return Err(Error::InvalidInput("Article text is required".to_string()).into());
    }

    let user = user.map_err(ApiError::from)?.0;
    let now = Utc::now();

    let profile = profiles.get(user.id).await?;
    match geogate_core::evaluate_rewrite(&profile, now) {
        QuotaDecision::Allowed { .. } => {}
        QuotaDecision::UpgradeRequired => {
            return Err(
                Error::UpgradeRequired(geogate_core::REWRITE_PLAN_MESSAGE.to_string()).into(),
            );
        }
        QuotaDecision::LimitReached { reset_date } => {
            return Err(Error::LimitReached { reset_date }.into());
        }
    }

    let reserved = profiles.reserve_rewrite(user.id, now).await?;
    let rewrites_remaining = PRO_REWRITES_PER_WINDOW - reserved.rewrites_count;

    match model.rewrite(&article).await {
        Ok(result) => {
            info!(
                user_id = %user.id,
                old_score = result.old_score,
                new_score = result.new_score,
                "article rewritten"
            );
            Ok(Json(RewriteResponse::new(result, rewrites_remaining)))
        }
        Err(e) => {
            if let Err(refund_err) = profiles.refund_rewrite(user.id, reserved.reset_date).await {
                warn!(user_id = %user.id, error = %refund_err, "rewrite refund failed");
            }
            Err(e.into())
        }
    }
}

/// Create the rewrite routes
pub fn rewrite_routes() -> Router {
    Router::new().route("/rewrite", post(rewrite))
}

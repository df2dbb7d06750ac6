//! Article analysis endpoint
//!
//! POST /analyze — scores an article for GEO readiness. Free plans get a
//! fixed number of analyses per 30-day window plus an IP-level request cap;
//! Pro plans are unlimited.

use crate::api::error::{ApiError, ErrorBody};
use crate::middleware::auth::{AuthRejection, RequireUser};
use crate::middleware::client_ip::client_ip;
use axum::{
    extract::rejection::JsonRejection,
    extract::Extension,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use geogate_core::{Error, Plan, ProfileStore, RateLimitStore, ANALYZE_ENDPOINT, IP_REQUESTS_PER_DAY};
use geogate_llm::{ArticleModel, CriterionScore, ScoreResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::ToSchema;

/// Request body for POST /analyze
#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    /// Article text to score
    pub article: String,
}

/// One scored criterion in the breakdown
#[derive(Debug, Serialize, ToSchema)]
pub struct CriterionReport {
    /// Criterion name
    pub criteria: String,
    /// Criterion score contribution
    pub score: u8,
    /// What holds the article back on this criterion
    pub issue: String,
}

impl From<CriterionScore> for CriterionReport {
    fn from(c: CriterionScore) -> Self {
        Self {
            criteria: c.criteria,
            score: c.score,
            issue: c.issue,
        }
    }
}

/// Response body for POST /analyze
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    /// Overall GEO score, 0-100
    pub score: u8,
    /// Bucket label derived from the score
    pub label: String,
    /// Per-criterion breakdown
    pub breakdown: Vec<CriterionReport>,
    /// Top problems found
    pub problems: Vec<String>,
}

impl From<ScoreResult> for AnalyzeResponse {
    fn from(result: ScoreResult) -> Self {
        Self {
            score: result.score,
            label: result.label,
            breakdown: result.breakdown.into_iter().map(Into::into).collect(),
            problems: result.problems,
        }
    }
}

/// Score an article for GEO readiness
#[utoipa::path(
    post,
    path = "/analyze",
    tag = "articles",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Article scored", body = AnalyzeResponse),
        (status = 400, description = "Missing or empty article", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 403, description = "Free plan quota spent", body = ErrorBody),
        (status = 429, description = "IP request cap hit", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn analyze(
    headers: HeaderMap,
    Extension(profiles): Extension<Arc<ProfileStore>>,
    Extension(rate_limits): Extension<Arc<RateLimitStore>>,
    Extension(model): Extension<Arc<dyn ArticleModel>>,
    user: Result<RequireUser, AuthRejection>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    // Body validation precedes auth.
    let Json(request) =
        body.map_err(|_| Error::InvalidInput("Article text is required".to_string()))?;
    let article = request.article.trim().to_string();
    if article.is_empty() {
        return Err(Error::InvalidInput("Article text is required".to_string()).into());
    }

    let user = user.map_err(|_| Error::AuthRequired)?.0;
    let now = Utc::now();

    let profile = profiles.get(user.id).await?;

    // Quota check comes before the IP cap so exhausted free users see the
    // upgrade prompt, not a rate-limit error.
    if let geogate_core::QuotaDecision::UpgradeRequired =
        geogate_core::evaluate_analyze(&profile, now)
    {
        return Err(Error::UpgradeRequired(geogate_core::FREE_LIMIT_MESSAGE.to_string()).into());
    }

    let ip = client_ip(&headers);
    if profile.plan == Plan::Free {
        let attempts = rate_limits.count_recent(&ip, ANALYZE_ENDPOINT, now).await?;
        if ip_capped(attempts) {
            warn!(ip = %ip, attempts, "analyze IP cap hit");
            return Err(Error::RateLimited.into());
        }
    }
    rate_limits.record(&ip, user.id, ANALYZE_ENDPOINT).await?;

    let reserved = profiles.reserve_analysis(user.id, now).await?;

    match model.score(&article).await {
        Ok(result) => {
            info!(user_id = %user.id, score = result.score, "article analyzed");
            Ok(Json(result.into()))
        }
        Err(e) => {
            // The reset_date guard keeps refunds from crossing a window reset.
            if let Err(refund_err) = profiles.refund_analysis(user.id, reserved.reset_date).await {
                warn!(user_id = %user.id, error = %refund_err, "analysis refund failed");
            }
            Err(e.into())
        }
    }
}

/// Whether already-logged attempts from an IP exhaust the per-day budget.
/// `attempts` counts prior requests, so the Nth request sees N-1.
fn ip_capped(attempts: i64) -> bool {
    attempts >= IP_REQUESTS_PER_DAY
}

/// Create the analyze routes
pub fn analyze_routes() -> Router {
    Router::new().route("/analyze", post(analyze))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twentieth_request_from_ip_allowed() {
        // The 20th request sees 19 prior attempts.
        assert!(!ip_capped(IP_REQUESTS_PER_DAY - 1));
    }

    #[test]
    fn twenty_first_request_from_ip_denied() {
        assert!(ip_capped(IP_REQUESTS_PER_DAY));
        assert!(ip_capped(IP_REQUESTS_PER_DAY + 1));
    }

    #[test]
    fn fresh_ip_not_capped() {
        assert!(!ip_capped(0));
    }
}

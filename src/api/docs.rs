//! API Documentation - Swagger UI
//!
//! Provides OpenAPI documentation at /docs

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::{
    analyze::{AnalyzeRequest, AnalyzeResponse, CriterionReport},
    billing::{CheckoutResponse, WebhookAck},
    error::ErrorBody,
    health::HealthResponse,
    rewrite::{RewriteRequest, RewriteResponse},
};

/// Geogate API OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Geogate API",
        version = "0.1.0",
        description = "GEO article scoring and rewriting API.

## Overview
Geogate scores articles for Generative Engine Optimization readiness and
rewrites them to score higher:
- **Analyze**: score an article 0-100 with a per-criterion breakdown
- **Rewrite**: produce an improved version (Pro plan)
- **Billing**: upgrade to Pro via Stripe Checkout

## Authentication
Analyze, rewrite, and checkout require a bearer token from the identity
service:
```
Authorization: Bearer <token>
```
",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        crate::api::analyze::analyze,
        crate::api::rewrite::rewrite,
        crate::api::billing::create_checkout,
        crate::api::health::health,
    ),
    components(schemas(
        AnalyzeRequest,
        AnalyzeResponse,
        CriterionReport,
        RewriteRequest,
        RewriteResponse,
        CheckoutResponse,
        WebhookAck,
        HealthResponse,
        ErrorBody,
    )),
    tags(
        (name = "articles", description = "Article scoring and rewriting"),
        (name = "billing", description = "Subscription checkout and webhooks"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Create the documentation routes
pub fn docs_routes() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_spec_includes_all_public_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/analyze"));
        assert!(paths.iter().any(|p| p.as_str() == "/rewrite"));
        assert!(paths.iter().any(|p| p.as_str() == "/create-checkout"));
        assert!(paths.iter().any(|p| p.as_str() == "/health"));
    }
}

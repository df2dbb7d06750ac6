//! Web API module for Geogate
//!
//! Provides REST API endpoints for:
//! - Article analysis (GEO scoring)
//! - Article rewriting (Pro plan)
//! - Billing (checkout session creation, payment webhooks)
//! - Health checks and OpenAPI docs

pub mod analyze;
pub mod billing;
pub mod docs;
pub mod error;
pub mod health;
pub mod rewrite;

use axum::Router;

pub use analyze::analyze_routes;
pub use billing::{billing_routes, BillingContext};
pub use docs::docs_routes;
pub use error::{ApiError, ErrorBody};
pub use health::health_routes;
pub use rewrite::rewrite_routes;

/// Create the API router with all endpoints
pub fn api_router() -> Router {
    Router::new()
        .merge(analyze_routes())
        .merge(rewrite_routes())
        .merge(billing_routes())
        .merge(health_routes())
        .merge(docs_routes())
}

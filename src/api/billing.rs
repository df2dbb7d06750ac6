//! Billing endpoints
//!
//! POST /create-checkout — creates a Stripe Checkout session for the Pro
//! subscription.
//! POST /stripe-webhook — receives signed Stripe events and applies plan
//! transitions through [`BillingSync`].

use crate::api::error::{ApiError, ErrorBody};
use crate::middleware::auth::RequireUser;
use crate::server::config::StripeSettings;
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use geogate_core::{BillingSync, CustomerRef, Error};
use serde::Serialize;
use std::sync::Arc;
use stripe::{
    CheckoutSession, CheckoutSessionMode, Client, CreateCheckoutSession,
    CreateCheckoutSessionLineItems, CreateCheckoutSessionPaymentMethodTypes, Customer, EventObject,
    EventType, Webhook,
};
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

/// Shared billing state: Stripe client, price configuration, and the plan
/// synchronizer.
pub struct BillingContext {
    client: Client,
    price_id: String,
    webhook_secret: String,
    site_url: String,
    sync: BillingSync,
}

impl BillingContext {
    /// Build from Stripe settings and a plan synchronizer
    pub fn new(settings: &StripeSettings, site_url: String, sync: BillingSync) -> Self {
        Self {
            client: Client::new(settings.secret_key.clone()),
            price_id: settings.price_id.clone(),
            webhook_secret: settings.webhook_secret.clone(),
            site_url,
            sync,
        }
    }
}

/// Response body for POST /create-checkout
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    /// Hosted checkout page URL to redirect the user to
    pub url: String,
}

/// Webhook acknowledgement body
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    /// Always true
    pub received: bool,
}

/// Create a Stripe Checkout session for the Pro subscription
#[utoipa::path(
    post,
    path = "/create-checkout",
    tag = "billing",
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutResponse),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 500, description = "Internal error", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn create_checkout(
    headers: HeaderMap,
    Extension(context): Extension<Arc<BillingContext>>,
    RequireUser(user): RequireUser,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let email = user.email.clone().ok_or(Error::Unauthorized)?;

    let origin = headers
        .get("origin")
        .and_then(|v| v.to_str().ok())
        .unwrap_or(&context.site_url)
        .to_string();
    let success_url = format!("{origin}/app?upgraded=true");
    let cancel_url = format!("{origin}/app");

    let mut params = CreateCheckoutSession::new();
    params.mode = Some(CheckoutSessionMode::Subscription);
    params.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);
    params.line_items = Some(vec![CreateCheckoutSessionLineItems {
        price: Some(context.price_id.clone()),
        quantity: Some(1),
        ..Default::default()
    }]);
    params.success_url = Some(&success_url);
    params.cancel_url = Some(&cancel_url);
    params.customer_email = Some(&email);
    params.metadata = Some(
        [("user_id".to_string(), user.id.to_string())]
            .into_iter()
            .collect(),
    );

    let session = CheckoutSession::create(&context.client, params)
        .await
        .map_err(|e| Error::Internal(format!("checkout session creation failed: {e}")))?;

    let url = session
        .url
        .ok_or_else(|| Error::Internal("checkout session has no URL".to_string()))?;

    info!(user_id = %user.id, session_id = %session.id, "checkout session created");
    Ok(Json(CheckoutResponse { url }))
}

enum WebhookFailure {
    Signature(String),
    Internal(Error),
}

/// Handle a signed Stripe webhook event
pub async fn stripe_webhook(
    Extension(context): Extension<Arc<BillingContext>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    match handle_webhook(&context, &headers, &body).await {
        Ok(()) => Json(WebhookAck { received: true }).into_response(),
        Err(WebhookFailure::Signature(detail)) => {
            warn!(detail = %detail, "webhook signature verification failed");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: "invalid_signature".to_string(),
                    message: "Webhook signature verification failed".to_string(),
                }),
            )
                .into_response()
        }
        Err(WebhookFailure::Internal(err)) => ApiError(err).into_response(),
    }
}

async fn handle_webhook(
    context: &BillingContext,
    headers: &HeaderMap,
    body: &str,
) -> Result<(), WebhookFailure> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| WebhookFailure::Signature("missing stripe-signature header".to_string()))?;

    let event = Webhook::construct_event(body, signature, &context.webhook_secret)
        .map_err(|e| WebhookFailure::Signature(e.to_string()))?;

    match event.type_ {
        EventType::CheckoutSessionCompleted => {
            if let EventObject::CheckoutSession(session) = event.data.object {
                let customer = checkout_customer(
                    session.metadata.as_ref(),
                    session.customer_email.as_deref(),
                );
                apply_checkout(&context.sync, customer)
                    .await
                    .map_err(WebhookFailure::Internal)?;
            }
        }
        EventType::CustomerSubscriptionDeleted => {
            if let EventObject::Subscription(subscription) = event.data.object {
                let customer_id = subscription.customer.id();
                let customer = Customer::retrieve(&context.client, &customer_id, &[])
                    .await
                    .map_err(|e| {
                        WebhookFailure::Internal(Error::Internal(format!(
                            "customer lookup failed: {e}"
                        )))
                    })?;
                match customer.email {
                    Some(email) => context
                        .sync
                        .deactivate(&email)
                        .await
                        .map_err(WebhookFailure::Internal)?,
                    None => warn!(customer_id = %customer_id, "cancelled customer has no email"),
                }
            }
        }
        other => debug!(event_type = %other, "ignoring webhook event"),
    }

    Ok(())
}

/// Apply a completed checkout. A session carrying no user reference at all
/// is logged and acked; retrying cannot make the reference appear.
async fn apply_checkout(
    sync: &BillingSync,
    customer: Option<CustomerRef>,
) -> Result<(), Error> {
    match customer {
        Some(customer) => sync.activate_pro(customer, Utc::now()).await,
        None => {
            warn!("checkout session carries no user reference");
            Ok(())
        }
    }
}

/// Resolve the target user from a completed checkout session: metadata
/// user_id first, customer email as fallback.
fn checkout_customer(
    metadata: Option<&stripe::Metadata>,
    customer_email: Option<&str>,
) -> Option<CustomerRef> {
    if let Some(id) = metadata
        .and_then(|m| m.get("user_id"))
        .and_then(|raw| Uuid::parse_str(raw).ok())
    {
        return Some(CustomerRef::UserId(id));
    }
    customer_email.map(|email| CustomerRef::Email(email.to_string()))
}

/// Create the billing routes
pub fn billing_routes() -> Router {
    Router::new()
        .route("/create-checkout", post(create_checkout))
        .route("/stripe-webhook", post(stripe_webhook))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(user_id: &str) -> stripe::Metadata {
        [("user_id".to_string(), user_id.to_string())]
            .into_iter()
            .collect()
    }

    #[test]
    fn checkout_customer_prefers_metadata_user_id() {
        let id = Uuid::new_v4();
        let meta = metadata(&id.to_string());
        match checkout_customer(Some(&meta), Some("fallback@example.com")) {
            Some(CustomerRef::UserId(resolved)) => assert_eq!(resolved, id),
            other => panic!("expected UserId, got {other:?}"),
        }
    }

    #[test]
    fn checkout_customer_falls_back_to_email_on_bad_uuid() {
        let meta = metadata("not-a-uuid");
        match checkout_customer(Some(&meta), Some("fallback@example.com")) {
            Some(CustomerRef::Email(email)) => assert_eq!(email, "fallback@example.com"),
            other => panic!("expected Email, got {other:?}"),
        }
    }

    #[test]
    fn checkout_customer_none_when_unidentified() {
        assert!(checkout_customer(None, None).is_none());
    }

    struct NoPlans;

    #[async_trait::async_trait]
    impl geogate_core::PlanStore for NoPlans {
        async fn set_plan_pro(
            &self,
            _id: Uuid,
            _reset_date: chrono::DateTime<Utc>,
        ) -> geogate_core::Result<()> {
            panic!("no plan transition expected");
        }

        async fn set_plan_free(&self, _id: Uuid) -> geogate_core::Result<()> {
            panic!("no plan transition expected");
        }
    }

    struct NoIdentity;

    #[async_trait::async_trait]
    impl geogate_core::IdentityProvider for NoIdentity {
        async fn verify_token(&self, _token: &str) -> geogate_core::Result<geogate_core::AuthUser> {
            Err(Error::Unauthorized)
        }

        async fn find_user_by_email(
            &self,
            _email: &str,
        ) -> geogate_core::Result<Option<geogate_core::AuthUser>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn unidentified_checkout_is_acked_not_failed() {
        let sync = BillingSync::new(Arc::new(NoPlans), Arc::new(NoIdentity));
        apply_checkout(&sync, None).await.unwrap();
    }
}

//! Server initialization and main run loop
//!
//! Contains the main `run()` function that wires stores, clients, and
//! routes together and starts the HTTP listener.

use super::loader::load_config;
use crate::api::{self, BillingContext};
use anyhow::{Context, Result};
use axum::Extension;
use geogate_core::{run_migrations, BillingSync, GoTrueClient, IdentityProvider, ProfileStore, RateLimitStore};
use geogate_llm::{AnthropicClient, AnthropicConfig, ArticleModel};
use sqlx::postgres::PgPoolOptions;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Run the server
pub async fn run(listen_override: Option<SocketAddr>) -> Result<()> {
    info!("Starting Geogate v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config().context("Failed to load configuration")?;
    info!("Configuration loaded");

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to Postgres")?;
    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database ready");

    let profiles = Arc::new(ProfileStore::new(pool.clone()));
    let rate_limits = Arc::new(RateLimitStore::new(pool));

    let identity: Arc<dyn IdentityProvider> = Arc::new(
        GoTrueClient::new(
            config.auth.base_url.clone(),
            config.auth.anon_key.clone(),
            config.auth.service_role_key.clone(),
        )
        .context("Failed to build identity client")?,
    );

    let mut model_config = AnthropicConfig::new(config.anthropic.api_key.clone());
    if let Some(base_url) = &config.anthropic.base_url {
        model_config = model_config.with_base_url(base_url.clone());
    }
    if let Some(model) = &config.anthropic.model {
        model_config = model_config.with_model(model.clone());
    }
    let model: Arc<dyn ArticleModel> =
        Arc::new(AnthropicClient::new(model_config).context("Failed to build Anthropic client")?);

    let billing = Arc::new(BillingContext::new(
        &config.stripe,
        config.site_url.clone(),
        BillingSync::new(profiles.clone(), identity.clone()),
    ));

    let app = api::api_router()
        .layer(Extension(profiles))
        .layer(Extension(rate_limits))
        .layer(Extension(identity))
        .layer(Extension(model))
        .layer(Extension(billing))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = match listen_override {
        Some(addr) => addr,
        None => {
            let host: IpAddr = config
                .server
                .host
                .parse()
                .with_context(|| format!("Invalid server host '{}'", config.server.host))?;
            SocketAddr::new(host, config.server.port)
        }
    };

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{addr}");
    info!("API docs at http://{addr}/docs");

    axum::serve(listener, app)
        .await
        .context("Server exited with error")
}

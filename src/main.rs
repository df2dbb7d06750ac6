//! Geogate - GEO article scoring and rewriting gateway
//!
//! Server entry point.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod middleware;
mod server;

#[derive(Debug, Parser)]
#[command(name = "geogate", version, about = "GEO article scoring and rewriting gateway")]
struct Cli {
    /// Listen address override (host:port)
    #[arg(long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geogate=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    server::run(cli.listen).await
}

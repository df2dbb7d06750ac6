//! Schema bootstrap
//!
//! Idempotent `CREATE TABLE IF NOT EXISTS` statements run at startup. The
//! profiles table is normally created (and populated) by the auth system's
//! signup trigger; creating it here keeps local development self-contained.

use sqlx::postgres::PgPool;
use tracing::debug;

use crate::error::{Error, Result};

/// Run all schema migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS profiles (
            id              UUID PRIMARY KEY,
            email           TEXT,
            plan            TEXT NOT NULL DEFAULT 'free',
            analyses_count  INTEGER NOT NULL DEFAULT 0,
            rewrites_count  INTEGER NOT NULL DEFAULT 0,
            reset_date      TIMESTAMPTZ NOT NULL,
            created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| Error::Database(e.to_string()))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ip_rate_limits (
            id          UUID PRIMARY KEY,
            ip_address  TEXT NOT NULL,
            user_id     UUID NOT NULL,
            endpoint    TEXT NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| Error::Database(e.to_string()))?;

    // Sliding-window counting scans by (ip, endpoint, recency)
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_ip_rate_limits_window
        ON ip_rate_limits (ip_address, endpoint, created_at)
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| Error::Database(e.to_string()))?;

    debug!("Schema migrations applied");
    Ok(())
}

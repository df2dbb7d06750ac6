//! IP rate-limit log
//!
//! Append-only attempt log used as a sliding-window counter: rows are never
//! updated or deleted, only counted over the trailing 24 hours. Attempts are
//! recorded before the downstream call, so failed calls still consume IP
//! budget.

use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Endpoint name recorded for analyze attempts
pub const ANALYZE_ENDPOINT: &str = "analyze";

/// Attempts allowed per IP per endpoint in a trailing 24-hour window
pub const IP_REQUESTS_PER_DAY: i64 = 20;

/// Store for the append-only IP attempt log
#[derive(Clone)]
pub struct RateLimitStore {
    pool: PgPool,
}

impl RateLimitStore {
    /// Create a new store over the given connection pool
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Count attempts for an exact IP string and endpoint within the
    /// trailing 24 hours.
    #[instrument(skip(self))]
    pub async fn count_recent(
        &self,
        ip_address: &str,
        endpoint: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM ip_rate_limits
            WHERE ip_address = $1 AND endpoint = $2 AND created_at >= $3
            "#,
        )
        .bind(ip_address)
        .bind(endpoint)
        .bind(now - Duration::hours(24))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(count)
    }

    /// Append one attempt row.
    #[instrument(skip(self))]
    pub async fn record(&self, ip_address: &str, user_id: Uuid, endpoint: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO ip_rate_limits (id, ip_address, user_id, endpoint, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(ip_address)
        .bind(user_id)
        .bind(endpoint)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }
}

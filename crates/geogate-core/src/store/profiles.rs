//! Profile store
//!
//! Reads and conditional mutations over the `profiles` table. The lazy
//! 30-day window reset is folded into the reservation statements with CASE
//! expressions, so reset + check + increment happen in one atomic UPDATE.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::profile::{next_reset, Plan, Profile};
use crate::quota::{FREE_LIMIT_MESSAGE, REWRITE_PLAN_MESSAGE};

const PROFILE_COLUMNS: &str =
    "id, email, plan, analyses_count, rewrites_count, reset_date, created_at";

/// Store for per-user plan and usage state
#[derive(Clone)]
pub struct ProfileStore {
    pool: PgPool,
}

fn row_to_profile(row: PgRow) -> Result<Profile> {
    let plan: String = row
        .try_get("plan")
        .map_err(|e| Error::Database(e.to_string()))?;
    Ok(Profile {
        id: row.try_get("id").map_err(|e| Error::Database(e.to_string()))?,
        email: row
            .try_get("email")
            .map_err(|e| Error::Database(e.to_string()))?,
        plan: Plan::parse(&plan)?,
        analyses_count: row
            .try_get("analyses_count")
            .map_err(|e| Error::Database(e.to_string()))?,
        rewrites_count: row
            .try_get("rewrites_count")
            .map_err(|e| Error::Database(e.to_string()))?,
        reset_date: row
            .try_get("reset_date")
            .map_err(|e| Error::Database(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| Error::Database(e.to_string()))?,
    })
}

impl ProfileStore {
    /// Create a new store over the given connection pool
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Fetch a profile by id
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Profile> {
        let row = sqlx::query(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?
        .ok_or(Error::ProfileNotFound)?;

        row_to_profile(row)
    }

    /// Atomically reserve one analysis.
    ///
    /// Applies the lazy window reset, checks the free-plan limit, and
    /// increments the counter in a single statement. Returns the post-update
    /// profile. Fails with `UpgradeRequired` when a free profile is at its
    /// limit inside a live window.
    #[instrument(skip(self))]
    pub async fn reserve_analysis(&self, id: Uuid, now: DateTime<Utc>) -> Result<Profile> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE profiles SET
                analyses_count = CASE WHEN reset_date < $2 THEN 1 ELSE analyses_count + 1 END,
                rewrites_count = CASE WHEN reset_date < $2 THEN 0 ELSE rewrites_count END,
                reset_date     = CASE WHEN reset_date < $2 THEN $3 ELSE reset_date END
            WHERE id = $1
              AND (plan = 'pro' OR reset_date < $2 OR analyses_count < $4)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(now)
        .bind(next_reset(now))
        .bind(crate::profile::FREE_ANALYSES_PER_WINDOW)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        match row {
            Some(row) => {
                let profile = row_to_profile(row)?;
                debug!(analyses_count = profile.analyses_count, "Reserved analysis");
                Ok(profile)
            }
            // No row updated: either the profile is missing or the free
            // quota is spent. A plain read tells the two apart.
            None => {
                self.get(id).await?;
                Err(Error::UpgradeRequired(FREE_LIMIT_MESSAGE.to_string()))
            }
        }
    }

    /// Undo an analysis reservation after a failed upstream call.
    ///
    /// Guarded on the reservation's window so a refund can never cross a
    /// reset, and floored at zero.
    #[instrument(skip(self))]
    pub async fn refund_analysis(&self, id: Uuid, reset_date: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET analyses_count = GREATEST(analyses_count - 1, 0)
            WHERE id = $1 AND reset_date = $2
            "#,
        )
        .bind(id)
        .bind(reset_date)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            warn!(user_id = %id, "Analysis refund skipped: window changed");
        }
        Ok(())
    }

    /// Atomically reserve one rewrite (pro plan only, 30 per window).
    #[instrument(skip(self))]
    pub async fn reserve_rewrite(&self, id: Uuid, now: DateTime<Utc>) -> Result<Profile> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE profiles SET
                rewrites_count = CASE WHEN reset_date < $2 THEN 1 ELSE rewrites_count + 1 END,
                analyses_count = CASE WHEN reset_date < $2 THEN 0 ELSE analyses_count END,
                reset_date     = CASE WHEN reset_date < $2 THEN $3 ELSE reset_date END
            WHERE id = $1
              AND plan = 'pro'
              AND (reset_date < $2 OR rewrites_count < $4)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(now)
        .bind(next_reset(now))
        .bind(crate::profile::PRO_REWRITES_PER_WINDOW)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        match row {
            Some(row) => {
                let profile = row_to_profile(row)?;
                debug!(rewrites_count = profile.rewrites_count, "Reserved rewrite");
                Ok(profile)
            }
            None => {
                let profile = self.get(id).await?;
                if profile.plan != Plan::Pro {
                    Err(Error::UpgradeRequired(REWRITE_PLAN_MESSAGE.to_string()))
                } else {
                    Err(Error::LimitReached {
                        reset_date: profile.reset_date,
                    })
                }
            }
        }
    }

    /// Undo a rewrite reservation after a failed upstream call.
    #[instrument(skip(self))]
    pub async fn refund_rewrite(&self, id: Uuid, reset_date: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET rewrites_count = GREATEST(rewrites_count - 1, 0)
            WHERE id = $1 AND reset_date = $2
            "#,
        )
        .bind(id)
        .bind(reset_date)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            warn!(user_id = %id, "Rewrite refund skipped: window changed");
        }
        Ok(())
    }

    /// Upgrade a profile to pro: fresh rewrite budget, fresh window.
    #[instrument(skip(self))]
    pub async fn set_plan_pro(&self, id: Uuid, reset_date: DateTime<Utc>) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET plan = 'pro', rewrites_count = 0, reset_date = $2
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(reset_date)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            warn!(user_id = %id, "Plan upgrade targeted a missing profile");
        }
        Ok(())
    }

    /// Downgrade a profile to free. Leaves `analyses_count` and `reset_date`
    /// untouched, mirroring the upgrade path's asymmetry.
    #[instrument(skip(self))]
    pub async fn set_plan_free(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET plan = 'free', rewrites_count = 0
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            warn!(user_id = %id, "Plan downgrade targeted a missing profile");
        }
        Ok(())
    }
}

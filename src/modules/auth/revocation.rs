use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::utils::errors::AppError;

/// Denylist for issued tokens. A token is revoked by its `jti`; the
/// original expiry is kept alongside so stale rows can be purged once the
/// tokens they block could no longer verify anyway.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Revokes the token. Returns `true` if this call inserted the
    /// revocation and `false` if the token was already revoked, so callers
    /// rotating a token can treat the insert as a claim on it.
    async fn revoke(&self, jti: Uuid, token_exp: DateTime<Utc>) -> Result<bool, AppError>;

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError>;
}

/// Postgres-backed denylist over the `revoked_tokens` table.
#[derive(Debug, Clone)]
pub struct PgRevocationStore {
    pool: PgPool,
}

impl PgRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Deletes denylist rows whose token has expired past the refresh
    /// window. Safe to run at any time.
    pub async fn purge_expired(&self, refresh_window_minutes: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM revoked_tokens
             WHERE token_exp + ($1::double precision * interval '1 minute') < now()",
        )
        .bind(refresh_window_minutes as f64)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RevocationStore for PgRevocationStore {
    async fn revoke(&self, jti: Uuid, token_exp: DateTime<Utc>) -> Result<bool, AppError> {
        // ON CONFLICT makes the insert the per-token serialization point:
        // of any number of concurrent revocations, exactly one inserts the
        // row and sees rows_affected = 1.
        let result = sqlx::query(
            "INSERT INTO revoked_tokens (jti, token_exp) VALUES ($1, $2)
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(token_exp)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn is_revoked(&self, jti: Uuid) -> Result<bool, AppError> {
        let revoked: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
                .bind(jti)
                .fetch_one(&self.pool)
                .await?;

        Ok(revoked)
    }
}

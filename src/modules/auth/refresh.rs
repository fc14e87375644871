//! Persisted refresh token store.
//!
//! Refresh tokens are opaque random values, single-use, and revocable; they
//! exist so that the stateless access tokens never need a revocation list.
//! Every mutation is a single keyed statement, so correctness under
//! concurrent requests comes from the database rather than an application
//! lock: the DELETE inside [`RefreshTokenStore::rotate`] is the atomic gate
//! that lets exactly one of two racing exchanges win.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sqlx::PgPool;
use sqlx::postgres::PgQueryResult;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::utils::errors::AppError;

/// Entropy of the opaque token value, before hex encoding.
const TOKEN_BYTES: usize = 40;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

pub struct RefreshTokenStore;

impl RefreshTokenStore {
    fn generate_value() -> String {
        let mut buf = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut buf);
        hex::encode(buf)
    }

    /// Persist a new token for the account and return its value. Multiple
    /// live tokens per account are fine; each device/session gets its own.
    #[instrument(skip(db))]
    pub async fn issue(
        db: &PgPool,
        user_id: Uuid,
        ttl_seconds: i64,
    ) -> Result<String, AppError> {
        let token = Self::generate_value();
        let expires_at = Utc::now() + Duration::seconds(ttl_seconds);

        sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(&token)
        .bind(expires_at)
        .execute(db)
        .await?;

        Ok(token)
    }

    /// Look up a token. Expired records are deleted on sight (lazy expiry)
    /// and reported as absent.
    #[instrument(skip(db, token))]
    pub async fn verify(
        db: &PgPool,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, AppError> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            "SELECT id, user_id, token, expires_at, created_at
             FROM refresh_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(db)
        .await?;

        let Some(record) = record else {
            return Ok(None);
        };

        if record.expires_at < Utc::now() {
            sqlx::query("DELETE FROM refresh_tokens WHERE id = $1")
                .bind(record.id)
                .execute(db)
                .await?;
            return Ok(None);
        }

        Ok(Some(record))
    }

    /// Exchange `old_token` for a fresh value in one failure-atomic step.
    ///
    /// The DELETE consumes the old token; zero rows means it was absent or
    /// already consumed by a concurrent exchange, and the whole attempt
    /// fails. An expired row is purged (the delete commits) and rejected,
    /// the same lazy expiry [`RefreshTokenStore::verify`] performs. Both
    /// statements of a successful exchange run in one transaction so a
    /// failure after the DELETE rolls the old token back instead of
    /// leaving the caller with nothing.
    #[instrument(skip(db, old_token))]
    pub async fn rotate(
        db: &PgPool,
        old_token: &str,
        ttl_seconds: i64,
    ) -> Result<(Uuid, String), AppError> {
        let mut tx = db.begin().await?;

        let consumed: Option<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            "DELETE FROM refresh_tokens WHERE token = $1
             RETURNING user_id, expires_at",
        )
        .bind(old_token)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((user_id, old_expires_at)) = consumed else {
            warn!("Refresh token rotation rejected: token unknown or already consumed");
            return Err(AppError::unauthorized("Invalid refresh token"));
        };

        if old_expires_at < Utc::now() {
            tx.commit().await?;
            warn!("Refresh token rotation rejected: token expired");
            return Err(AppError::unauthorized("Invalid refresh token"));
        }

        let token = Self::generate_value();
        let expires_at = Utc::now() + Duration::seconds(ttl_seconds);

        let issued = sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(&token)
        .bind(expires_at)
        .execute(&mut *tx)
        .await;

        if let Err(e) = issued {
            // Dropping the transaction rolls back the DELETE, so the old
            // token is not lost mid-exchange.
            warn!(error = %e, "Refresh token replacement failed, rolling back rotation");
            return Err(AppError::unauthorized("Invalid refresh token"));
        }

        tx.commit().await?;

        info!(user.id = %user_id, "Refresh token rotated");

        Ok((user_id, token))
    }

    /// Delete a token. Revoking an absent or already-revoked value is a
    /// no-op, not an error.
    #[instrument(skip(db, token))]
    pub async fn revoke(db: &PgPool, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(db)
            .await?;

        Ok(())
    }

    /// Drop every live token for an account; returns how many were revoked.
    #[instrument(skip(db))]
    pub async fn revoke_all(db: &PgPool, user_id: Uuid) -> Result<u64, AppError> {
        let result: PgQueryResult =
            sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
                .bind(user_id)
                .execute(db)
                .await?;

        Ok(result.rows_affected())
    }
}

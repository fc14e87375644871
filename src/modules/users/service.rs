use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::utils::errors::AppError;
use crate::utils::public_id::{self, Reservation, is_unique_violation_on};

use super::model::{AccountRow, User};

pub struct UserService;

impl UserService {
    #[instrument(skip(db))]
    pub async fn find_account_by_email(
        db: &PgPool,
        email: &str,
    ) -> Result<Option<AccountRow>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, email, password, public_id, org_public_id FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(db)
        .await?;

        Ok(row)
    }

    #[instrument(skip(db))]
    pub async fn find_account_by_id(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<AccountRow>, AppError> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, email, password, public_id, org_public_id FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;

        Ok(row)
    }

    /// Create an account with a freshly allocated public identifier.
    ///
    /// The identifier is assigned before the row exists and the INSERT is
    /// the reservation: a unique violation on `public_id` is one allocator
    /// retry, while a violation on `email` surfaces as a duplicate account.
    #[instrument(skip(db, password_hash))]
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let user = public_id::allocate(|candidate| async move {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM users WHERE public_id = $1)",
            )
            .bind(&candidate)
            .fetch_one(db)
            .await?;

            if exists {
                return Ok(Reservation::Taken);
            }

            match sqlx::query_as::<_, User>(
                "INSERT INTO users (email, password, public_id)
                 VALUES ($1, $2, $3)
                 RETURNING id, email, public_id, org_public_id",
            )
            .bind(email)
            .bind(password_hash)
            .bind(&candidate)
            .fetch_one(db)
            .await
            {
                Ok(user) => Ok(Reservation::Reserved(user)),
                Err(e) if is_unique_violation_on(&e, "users_public_id_key") => {
                    Ok(Reservation::Taken)
                }
                Err(e) if is_unique_violation_on(&e, "users_email_key") => {
                    Err(AppError::bad_request("Email already exists"))
                }
                Err(e) => Err(e.into()),
            }
        })
        .await?;

        info!(user.id = %user.id, user.public_id = %user.public_id, "Account created");

        Ok(user)
    }

    /// Return the account's public identifier, allocating one for accounts
    /// that predate public identifiers.
    ///
    /// The conditional UPDATE only fills a NULL column, so a concurrent
    /// back-fill of the same account cannot be overwritten; if another
    /// request won the race, the identifier it stored is returned instead.
    #[instrument(skip(db, current))]
    pub async fn ensure_public_id(
        db: &PgPool,
        user_id: Uuid,
        current: Option<String>,
    ) -> Result<String, AppError> {
        if let Some(public_id) = current {
            return Ok(public_id);
        }

        public_id::allocate(|candidate| async move {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM users WHERE public_id = $1)",
            )
            .bind(&candidate)
            .fetch_one(db)
            .await?;

            if exists {
                return Ok(Reservation::Taken);
            }

            let result = match sqlx::query(
                "UPDATE users SET public_id = $1, updated_at = now()
                 WHERE id = $2 AND public_id IS NULL",
            )
            .bind(&candidate)
            .bind(user_id)
            .execute(db)
            .await
            {
                Ok(result) => result,
                Err(e) if is_unique_violation_on(&e, "users_public_id_key") => {
                    return Ok(Reservation::Taken);
                }
                Err(e) => return Err(e.into()),
            };

            if result.rows_affected() == 1 {
                return Ok(Reservation::Reserved(candidate));
            }

            // Lost the back-fill race; pick up whatever got stored.
            let existing: Option<String> =
                sqlx::query_scalar("SELECT public_id FROM users WHERE id = $1")
                    .bind(user_id)
                    .fetch_one(db)
                    .await?;

            existing.map(Reservation::Reserved).ok_or_else(|| {
                AppError::internal(anyhow::anyhow!(
                    "account {user_id} disappeared during public id back-fill"
                ))
            })
        })
        .await
    }

    /// Record the public identifier of the organization an account owns.
    /// First write wins; later org creations leave the link untouched.
    #[instrument(skip(db))]
    pub async fn link_org_public_id(
        db: &PgPool,
        user_id: Uuid,
        org_public_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users SET org_public_id = $1, updated_at = now()
             WHERE id = $2 AND org_public_id IS NULL",
        )
        .bind(org_public_id)
        .bind(user_id)
        .execute(db)
        .await?;

        Ok(())
    }
}

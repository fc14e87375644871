use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::users::model::User;
use crate::modules::users::service::UserService;
use crate::utils::errors::AppError;
use crate::utils::jwt::create_access_token;
use crate::utils::password::{hash_password_blocking, verify_password_blocking};

use super::model::{LoginRequest, RegisterRequest};
use super::refresh::RefreshTokenStore;

/// Access + refresh pair handed out on register, login and refresh.
#[derive(Debug)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthService;

impl AuthService {
    /// Hash the password, create the account (allocating its public
    /// identifier) and open a session.
    #[instrument(skip(db, jwt_config, dto))]
    pub async fn register(
        db: &PgPool,
        jwt_config: &JwtConfig,
        dto: RegisterRequest,
    ) -> Result<(User, SessionTokens), AppError> {
        let existing = UserService::find_account_by_email(db, &dto.email).await?;
        if existing.is_some() {
            return Err(AppError::bad_request("Email already exists"));
        }

        let hashed_password = hash_password_blocking(dto.password).await?;

        let user = UserService::create(db, &dto.email, &hashed_password).await?;
        let tokens = Self::open_session(db, jwt_config, user.id, &user.public_id).await?;

        Ok((user, tokens))
    }

    /// Verify credentials and open a session. Unknown emails and wrong
    /// passwords are deliberately distinguishable (404 vs 400); that is
    /// the long-standing contract with existing clients.
    #[instrument(skip(db, jwt_config, dto))]
    pub async fn login(
        db: &PgPool,
        jwt_config: &JwtConfig,
        dto: LoginRequest,
    ) -> Result<(User, SessionTokens), AppError> {
        let account = UserService::find_account_by_email(db, &dto.email)
            .await?
            .ok_or_else(|| AppError::not_found("Email not found"))?;

        let password_ok =
            verify_password_blocking(dto.password, account.password.clone()).await?;
        if !password_ok {
            return Err(AppError::bad_request("Passwords does not match"));
        }

        // Accounts that predate public identifiers get one here.
        let public_id =
            UserService::ensure_public_id(db, account.id, account.public_id.clone()).await?;

        let tokens = Self::open_session(db, jwt_config, account.id, &public_id).await?;
        let user = account.into_user(public_id);

        info!(user.id = %user.id, "Login successful");

        Ok((user, tokens))
    }

    /// Exchange a refresh token for a new access token, rotating the
    /// refresh token in the same step. A consumed, expired or unknown
    /// token fails the whole exchange.
    #[instrument(skip(db, jwt_config, provided))]
    pub async fn refresh(
        db: &PgPool,
        jwt_config: &JwtConfig,
        provided: &str,
    ) -> Result<SessionTokens, AppError> {
        let (user_id, refresh_token) =
            RefreshTokenStore::rotate(db, provided, jwt_config.refresh_token_expiry).await?;

        let account = UserService::find_account_by_id(db, user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User not found"))?;

        let public_id =
            UserService::ensure_public_id(db, account.id, account.public_id).await?;

        let access_token = create_access_token(user_id, &public_id, jwt_config)?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }

    /// Revoke the presented refresh token. Idempotent.
    #[instrument(skip(db, provided))]
    pub async fn logout(db: &PgPool, provided: &str) -> Result<(), AppError> {
        RefreshTokenStore::revoke(db, provided).await
    }

    /// Revoke every refresh token the account holds, ending all sessions.
    #[instrument(skip(db))]
    pub async fn logout_all(db: &PgPool, user_id: Uuid) -> Result<u64, AppError> {
        RefreshTokenStore::revoke_all(db, user_id).await
    }

    async fn open_session(
        db: &PgPool,
        jwt_config: &JwtConfig,
        user_id: Uuid,
        public_id: &str,
    ) -> Result<SessionTokens, AppError> {
        let access_token = create_access_token(user_id, public_id, jwt_config)?;
        let refresh_token =
            RefreshTokenStore::issue(db, user_id, jwt_config.refresh_token_expiry).await?;

        Ok(SessionTokens {
            access_token,
            refresh_token,
        })
    }
}

use bcrypt::{hash, verify};

use crate::utils::errors::AppError;

const BCRYPT_COST: u32 = 10;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST).map_err(AppError::internal)
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, AppError> {
    verify(password, hashed).map_err(AppError::internal)
}

/// Hash on the blocking pool so bcrypt's CPU work never stalls the
/// request-serving workers.
pub async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(AppError::internal)?
}

/// Verify on the blocking pool; see [`hash_password_blocking`].
pub async fn verify_password_blocking(
    password: String,
    hashed: String,
) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hashed))
        .await
        .map_err(AppError::internal)?
}

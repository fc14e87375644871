use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Deserialize;
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::Claims;
use crate::utils::errors::AppError;

/// Wire shape of the token payload. `public_id` is optional here because
/// tokens issued before public identifiers existed lack it; those decode
/// fine but are rejected when converted to [`Claims`].
#[derive(Debug, Deserialize)]
struct RawClaims {
    sub: String,
    public_id: Option<String>,
    exp: usize,
    iat: usize,
}

pub fn create_access_token(
    user_id: Uuid,
    public_id: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp() as usize;
    let exp = now + jwt_config.access_token_expiry as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        public_id: public_id.to_string(),
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(AppError::internal)
}

/// Verify signature, structure and expiry, then gate on claims completeness.
///
/// Signature/structure/expiry failures all collapse to the same response so
/// callers learn nothing about which check failed. A structurally valid token
/// without a `public_id` claim predates the current format and forces
/// re-login.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let raw = decode::<RawClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

    let public_id = raw
        .public_id
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::unauthorized("Incomplete token claims - reauthenticate"))?;

    Ok(Claims {
        sub: raw.sub,
        public_id,
        exp: raw.exp,
        iat: raw.iat,
    })
}

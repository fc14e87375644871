use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::instrument;
use utoipa::ToSchema;

use crate::config::cookies::CookieConfig;
use crate::middleware::auth::{ACCESS_TOKEN_COOKIE, AuthUser};
use crate::modules::users::model::User;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{
    LoginRequest, LoginResponse, LogoutResponse, RefreshRequest, RegisterRequest,
    RegisterResponse, TokenResponse,
};
use super::service::{AuthService, SessionTokens};

pub const REFRESH_TOKEN_COOKIE: &str = "REFRESH_TOKEN";

#[derive(ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, session opened", body = RegisterResponse),
        (status = 400, description = "Validation error or email already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, dto))]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<RegisterResponse>), AppError> {
    let (user, tokens) = AuthService::register(&state.db, &state.jwt_config, dto).await?;

    let jar = set_session_cookies(jar, &tokens, &state);

    Ok((
        StatusCode::CREATED,
        jar,
        Json(RegisterResponse {
            message: "User Created Successfully".to_string(),
            user,
            token: tokens.access_token,
        }),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Wrong password", body = ErrorResponse),
        (status = 404, description = "Email not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, dto))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let (user, tokens) = AuthService::login(&state.db, &state.jwt_config, dto).await?;

    let jar = set_session_cookies(jar, &tokens, &state);

    Ok((
        jar,
        Json(LoginResponse {
            message: "Login Successful".to_string(),
            email: user.email,
            token: tokens.access_token,
        }),
    ))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token issued, refresh token rotated", body = TokenResponse),
        (status = 401, description = "Missing, expired or already-consumed refresh token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, body))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    let provided = refresh_token_from(&jar, body)
        .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))?;

    let tokens = AuthService::refresh(&state.db, &state.jwt_config, &provided).await?;

    let jar = set_session_cookies(jar, &tokens, &state);

    Ok((
        jar,
        Json(TokenResponse {
            token: tokens.access_token,
        }),
    ))
}

/// Revoke the presented refresh token and clear session cookies
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token revoked (no-op when already revoked)", body = LogoutResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, body))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, Json<LogoutResponse>), AppError> {
    if let Some(provided) = refresh_token_from(&jar, body) {
        AuthService::logout(&state.db, &provided).await?;
    }

    Ok((clear_session_cookies(jar), Json(LogoutResponse { revoked: true })))
}

/// Revoke every refresh token of the calling account
#[utoipa::path(
    post,
    path = "/api/auth/logout-all",
    responses(
        (status = 200, description = "All sessions revoked", body = LogoutResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, jar, auth_user))]
pub async fn logout_all(
    State(state): State<AppState>,
    auth_user: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<LogoutResponse>), AppError> {
    let user_id = auth_user.user_id()?;
    AuthService::logout_all(&state.db, user_id).await?;

    Ok((clear_session_cookies(jar), Json(LogoutResponse { revoked: true })))
}

fn refresh_token_from(jar: &CookieJar, body: Option<Json<RefreshRequest>>) -> Option<String> {
    body.and_then(|Json(req)| req.refresh_token)
        .or_else(|| jar.get(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string()))
        .filter(|token| !token.is_empty())
}

fn session_cookie(
    name: &'static str,
    value: String,
    max_age_seconds: i64,
    config: &CookieConfig,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(config.secure)
        // Cross-origin frontends need SameSite=None, which browsers only
        // honor together with Secure.
        .same_site(if config.secure {
            SameSite::None
        } else {
            SameSite::Lax
        })
        .max_age(time::Duration::seconds(max_age_seconds))
        .build()
}

fn set_session_cookies(jar: CookieJar, tokens: &SessionTokens, state: &AppState) -> CookieJar {
    jar.add(session_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access_token.clone(),
        state.jwt_config.access_token_expiry,
        &state.cookie_config,
    ))
    .add(session_cookie(
        REFRESH_TOKEN_COOKIE,
        tokens.refresh_token.clone(),
        state.jwt_config.refresh_token_expiry,
        &state.cookie_config,
    ))
}

fn clear_session_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build((ACCESS_TOKEN_COOKIE, "")).path("/").build())
        .remove(Cookie::build((REFRESH_TOKEN_COOKIE, "")).path("/").build())
}

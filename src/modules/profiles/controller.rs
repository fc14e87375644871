use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

use super::model::{CreateProfileDto, ProfileResponse, UpdateProfileDto};
use super::service::ProfileService;

/// Get a profile by the owner's internal account id (public)
#[utoipa::path(
    get,
    path = "/api/profiles/{user_id}",
    params(("user_id" = Uuid, Path, description = "Internal account id")),
    responses(
        (status = 200, description = "Profile found", body = ProfileResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    tag = "Profiles"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, AppError> {
    ProfileService::get_by_user_id(&state.db, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Profile not found"))
}

/// Get a profile by the owner's public identifier (public)
#[utoipa::path(
    get,
    path = "/api/profiles/by-public-id/{public_id}",
    params(("public_id" = String, Path, description = "8-character public identifier")),
    responses(
        (status = 200, description = "Profile found", body = ProfileResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    tag = "Profiles"
)]
#[instrument(skip(state))]
pub async fn get_profile_by_public_id(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<Json<ProfileResponse>, AppError> {
    ProfileService::get_by_public_id(&state.db, &public_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Profile not found"))
}

/// Create the calling account's profile
#[utoipa::path(
    post,
    path = "/api/profiles",
    request_body = CreateProfileDto,
    responses(
        (status = 201, description = "Profile created", body = ProfileResponse),
        (status = 400, description = "Profile already exists or referenced org missing", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Profiles",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateProfileDto>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    let owner_id = auth_user.user_id()?;
    let profile = ProfileService::create(&state.db, owner_id, dto).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Update a profile (owner only)
#[utoipa::path(
    patch,
    path = "/api/profiles/{user_id}",
    params(("user_id" = Uuid, Path, description = "Internal account id")),
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = ProfileResponse),
        (status = 401, description = "Not the profile owner", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    tag = "Profiles",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<ProfileResponse>, AppError> {
    if auth_user.user_id()? != user_id {
        return Err(AppError::unauthorized("Cannot update another user profile"));
    }

    let profile = ProfileService::update(&state.db, user_id, dto).await?;
    Ok(Json(profile))
}

/// Delete a profile (owner only)
#[utoipa::path(
    delete,
    path = "/api/profiles/{user_id}",
    params(("user_id" = Uuid, Path, description = "Internal account id")),
    responses(
        (status = 200, description = "Profile deleted"),
        (status = 401, description = "Not the profile owner", body = ErrorResponse),
        (status = 404, description = "Profile not found", body = ErrorResponse)
    ),
    tag = "Profiles",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if auth_user.user_id()? != user_id {
        return Err(AppError::unauthorized("Cannot delete another user profile"));
    }

    ProfileService::delete(&state.db, user_id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

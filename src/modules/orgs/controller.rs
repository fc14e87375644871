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

use super::model::{CreateOrgDto, OrgResponse, UpdateOrgDto};
use super::service::OrgService;

/// List all organizations (public)
#[utoipa::path(
    get,
    path = "/api/orgs",
    responses(
        (status = 200, description = "All organizations with their specialties", body = [OrgResponse])
    ),
    tag = "Organizations"
)]
#[instrument(skip(state))]
pub async fn list_orgs(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrgResponse>>, AppError> {
    let orgs = OrgService::list(&state.db).await?;
    Ok(Json(orgs))
}

/// Get one organization (public)
#[utoipa::path(
    get,
    path = "/api/orgs/{id}",
    params(("id" = Uuid, Path, description = "Organization id")),
    responses(
        (status = 200, description = "Organization found", body = OrgResponse),
        (status = 404, description = "Organization not found", body = ErrorResponse)
    ),
    tag = "Organizations"
)]
#[instrument(skip(state))]
pub async fn get_org(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrgResponse>, AppError> {
    OrgService::get_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Org not found"))
}

/// Create an organization owned by the caller
#[utoipa::path(
    post,
    path = "/api/orgs",
    request_body = CreateOrgDto,
    responses(
        (status = 201, description = "Organization created", body = OrgResponse),
        (status = 400, description = "Validation error or unknown specialty", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_org(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateOrgDto>,
) -> Result<(StatusCode, Json<OrgResponse>), AppError> {
    let owner_id = auth_user.user_id()?;
    let org =
        OrgService::create(&state.db, owner_id, auth_user.public_id(), dto).await?;

    Ok((StatusCode::CREATED, Json(org)))
}

/// Update an organization (owner only)
#[utoipa::path(
    patch,
    path = "/api/orgs/{id}",
    params(("id" = Uuid, Path, description = "Organization id")),
    request_body = UpdateOrgDto,
    responses(
        (status = 200, description = "Organization updated", body = OrgResponse),
        (status = 400, description = "Unknown specialty", body = ErrorResponse),
        (status = 401, description = "Not the org owner", body = ErrorResponse),
        (status = 404, description = "Org not found", body = ErrorResponse)
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_org(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateOrgDto>,
) -> Result<Json<OrgResponse>, AppError> {
    let caller_id = auth_user.user_id()?;
    let org = OrgService::update(&state.db, id, caller_id, dto).await?;

    Ok(Json(org))
}

/// Delete an organization (owner only)
#[utoipa::path(
    delete,
    path = "/api/orgs/{id}",
    params(("id" = Uuid, Path, description = "Organization id")),
    responses(
        (status = 200, description = "Organization deleted"),
        (status = 401, description = "Not the org owner", body = ErrorResponse),
        (status = 404, description = "Org not found", body = ErrorResponse)
    ),
    tag = "Organizations",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_org(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let caller_id = auth_user.user_id()?;
    OrgService::delete(&state.db, id, caller_id).await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

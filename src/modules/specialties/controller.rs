use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::state::AppState;
use crate::utils::errors::AppError;

use super::model::Specialty;
use super::service::SpecialtyService;

/// List the specialty taxonomy (public)
#[utoipa::path(
    get,
    path = "/api/specialties",
    responses(
        (status = 200, description = "All specialties", body = [Specialty])
    ),
    tag = "Specialties"
)]
#[instrument(skip(state))]
pub async fn list_specialties(
    State(state): State<AppState>,
) -> Result<Json<Vec<Specialty>>, AppError> {
    let specialties = SpecialtyService::list(&state.db).await?;
    Ok(Json(specialties))
}

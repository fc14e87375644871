use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::utils::errors::AppError;

use super::model::Specialty;

pub struct SpecialtyService;

impl SpecialtyService {
    #[instrument(skip(db))]
    pub async fn list(db: &PgPool) -> Result<Vec<Specialty>, AppError> {
        let specialties = sqlx::query_as::<_, Specialty>(
            "SELECT id, name, code, created_at, updated_at FROM specialties ORDER BY code",
        )
        .fetch_all(db)
        .await?;

        Ok(specialties)
    }

    /// Fail unless every referenced specialty exists.
    #[instrument(skip(db, ids))]
    pub async fn verify_exist(db: &PgPool, ids: &[Uuid]) -> Result<(), AppError> {
        if ids.is_empty() {
            return Ok(());
        }

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM specialties WHERE id = ANY($1)")
                .bind(ids)
                .fetch_one(db)
                .await?;

        if count != ids.len() as i64 {
            return Err(AppError::bad_request("One or more specialties not found"));
        }

        Ok(())
    }
}

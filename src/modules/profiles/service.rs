use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::utils::errors::AppError;
use crate::utils::public_id::is_unique_violation_on;

use super::model::{CreateProfileDto, ProfileResponse, ProfileRow, UpdateProfileDto};

const PROFILE_SELECT: &str = "SELECT p.id, p.user_id, p.first_name, p.last_name, p.title,
        p.email, p.phone, p.is_available, p.profile_image_url, p.org_id,
        o.name AS org_name, p.created_at, p.updated_at
 FROM profiles p LEFT JOIN orgs o ON o.id = p.org_id";

pub struct ProfileService;

impl ProfileService {
    #[instrument(skip(db, dto))]
    pub async fn create(
        db: &PgPool,
        owner_id: Uuid,
        dto: CreateProfileDto,
    ) -> Result<ProfileResponse, AppError> {
        if let Some(org_id) = dto.org_id {
            Self::verify_org_exists(db, org_id).await?;
        }

        let inserted: Uuid = sqlx::query_scalar(
            "INSERT INTO profiles
                (user_id, first_name, last_name, title, email, phone,
                 is_available, profile_image_url, org_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING id",
        )
        .bind(owner_id)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.title)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(dto.is_available)
        .bind(&dto.profile_image_url)
        .bind(dto.org_id)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if is_unique_violation_on(&e, "profiles_user_id_key") {
                AppError::bad_request("Profile already exists for this user")
            } else {
                e.into()
            }
        })?;

        info!(profile.id = %inserted, user.id = %owner_id, "Profile created");

        Self::fetch_by_id(db, inserted).await
    }

    #[instrument(skip(db))]
    pub async fn get_by_user_id(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<Option<ProfileResponse>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "{PROFILE_SELECT} WHERE p.user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;

        Ok(row.map(ProfileResponse::from))
    }

    /// Look up by the owner's short public identifier.
    #[instrument(skip(db))]
    pub async fn get_by_public_id(
        db: &PgPool,
        public_id: &str,
    ) -> Result<Option<ProfileResponse>, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "{PROFILE_SELECT} JOIN users u ON u.id = p.user_id WHERE u.public_id = $1"
        ))
        .bind(public_id)
        .fetch_optional(db)
        .await?;

        Ok(row.map(ProfileResponse::from))
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        owner_id: Uuid,
        dto: UpdateProfileDto,
    ) -> Result<ProfileResponse, AppError> {
        if let Some(org_id) = dto.org_id {
            Self::verify_org_exists(db, org_id).await?;
        }

        let updated: Option<Uuid> = sqlx::query_scalar(
            "UPDATE profiles SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                title = COALESCE($4, title),
                email = COALESCE($5, email),
                phone = COALESCE($6, phone),
                is_available = COALESCE($7, is_available),
                profile_image_url = COALESCE($8, profile_image_url),
                org_id = COALESCE($9, org_id),
                updated_at = now()
             WHERE user_id = $1
             RETURNING id",
        )
        .bind(owner_id)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.title)
        .bind(&dto.email)
        .bind(&dto.phone)
        .bind(dto.is_available)
        .bind(&dto.profile_image_url)
        .bind(dto.org_id)
        .fetch_optional(db)
        .await?;

        let profile_id =
            updated.ok_or_else(|| AppError::not_found("Profile not found"))?;

        Self::fetch_by_id(db, profile_id).await
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, owner_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(owner_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Profile not found"));
        }

        Ok(())
    }

    async fn fetch_by_id(db: &PgPool, profile_id: Uuid) -> Result<ProfileResponse, AppError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!("{PROFILE_SELECT} WHERE p.id = $1"))
            .bind(profile_id)
            .fetch_one(db)
            .await?;

        Ok(ProfileResponse::from(row))
    }

    async fn verify_org_exists(db: &PgPool, org_id: Uuid) -> Result<(), AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orgs WHERE id = $1)")
                .bind(org_id)
                .fetch_one(db)
                .await?;

        if !exists {
            return Err(AppError::bad_request("Organization not found"));
        }

        Ok(())
    }
}

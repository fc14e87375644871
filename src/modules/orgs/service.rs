use std::collections::HashMap;

use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::modules::specialties::model::Specialty;
use crate::modules::specialties::service::SpecialtyService;
use crate::modules::users::service::UserService;
use crate::utils::errors::AppError;
use crate::utils::public_id::{self, Reservation, is_unique_violation_on};

use super::model::{CreateOrgDto, OrgResponse, OrgRow, UpdateOrgDto};

const ORG_SELECT: &str = "SELECT id, owner_id, owner_public_id, public_id, name, org_image_url,
        phone, address, city, state, zipcode, is_open,
        donations_needed, donations_acquired, created_at, updated_at
 FROM orgs";

#[derive(sqlx::FromRow)]
struct OrgSpecialtyRow {
    org_id: Uuid,
    id: Uuid,
    name: String,
    code: Option<i32>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

pub struct OrgService;

impl OrgService {
    /// Create an organization owned by the caller, allocating its public
    /// identifier in the orgs namespace. The INSERT is the identifier
    /// reservation; a unique violation on it is one allocator retry.
    #[instrument(skip(db, dto), fields(org.name = %dto.name))]
    pub async fn create(
        db: &PgPool,
        owner_id: Uuid,
        owner_public_id: &str,
        dto: CreateOrgDto,
    ) -> Result<OrgResponse, AppError> {
        SpecialtyService::verify_exist(db, &dto.specialties).await?;

        let dto_ref = &dto;
        let org_id: Uuid = public_id::allocate(|candidate| async move {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orgs WHERE public_id = $1)")
                    .bind(&candidate)
                    .fetch_one(db)
                    .await?;

            if exists {
                return Ok(Reservation::Taken);
            }

            match sqlx::query_scalar::<_, Uuid>(
                "INSERT INTO orgs
                    (owner_id, owner_public_id, public_id, name, org_image_url, phone,
                     address, city, state, zipcode, is_open,
                     donations_needed, donations_acquired)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                 RETURNING id",
            )
            .bind(owner_id)
            .bind(owner_public_id)
            .bind(&candidate)
            .bind(&dto_ref.name)
            .bind(&dto_ref.org_image_url)
            .bind(&dto_ref.phone)
            .bind(&dto_ref.address)
            .bind(&dto_ref.city)
            .bind(&dto_ref.state)
            .bind(&dto_ref.zipcode)
            .bind(dto_ref.is_open)
            .bind(dto_ref.donations_needed)
            .bind(dto_ref.donations_acquired)
            .fetch_one(db)
            .await
            {
                Ok(id) => Ok(Reservation::Reserved(id)),
                Err(e) if is_unique_violation_on(&e, "orgs_public_id_key") => {
                    Ok(Reservation::Taken)
                }
                Err(e) => Err(e.into()),
            }
        })
        .await?;

        Self::set_specialties(db, org_id, &dto.specialties).await?;

        let org = Self::fetch_by_id(db, org_id).await?;

        // First org the account creates becomes its linked org.
        UserService::link_org_public_id(db, owner_id, &org.public_id).await?;

        info!(org.id = %org_id, org.public_id = %org.public_id, "Organization created");

        Ok(org)
    }

    #[instrument(skip(db))]
    pub async fn list(db: &PgPool) -> Result<Vec<OrgResponse>, AppError> {
        let rows = sqlx::query_as::<_, OrgRow>(&format!("{ORG_SELECT} ORDER BY created_at"))
            .fetch_all(db)
            .await?;

        let org_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut by_org = Self::specialties_for(db, &org_ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let specialties = by_org.remove(&row.id).unwrap_or_default();
                OrgResponse::from_row(row, specialties)
            })
            .collect())
    }

    #[instrument(skip(db))]
    pub async fn get_by_id(db: &PgPool, org_id: Uuid) -> Result<Option<OrgResponse>, AppError> {
        let row = sqlx::query_as::<_, OrgRow>(&format!("{ORG_SELECT} WHERE id = $1"))
            .bind(org_id)
            .fetch_optional(db)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut by_org = Self::specialties_for(db, &[row.id]).await?;
        let specialties = by_org.remove(&row.id).unwrap_or_default();

        Ok(Some(OrgResponse::from_row(row, specialties)))
    }

    #[instrument(skip(db, dto))]
    pub async fn update(
        db: &PgPool,
        org_id: Uuid,
        caller_id: Uuid,
        dto: UpdateOrgDto,
    ) -> Result<OrgResponse, AppError> {
        Self::require_owner(db, org_id, caller_id, "Cannot modify org you do not own").await?;

        if let Some(specialties) = &dto.specialties {
            SpecialtyService::verify_exist(db, specialties).await?;
        }

        sqlx::query(
            "UPDATE orgs SET
                name = COALESCE($2, name),
                org_image_url = COALESCE($3, org_image_url),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address),
                city = COALESCE($6, city),
                state = COALESCE($7, state),
                zipcode = COALESCE($8, zipcode),
                is_open = COALESCE($9, is_open),
                donations_needed = COALESCE($10, donations_needed),
                donations_acquired = COALESCE($11, donations_acquired),
                updated_at = now()
             WHERE id = $1",
        )
        .bind(org_id)
        .bind(&dto.name)
        .bind(&dto.org_image_url)
        .bind(&dto.phone)
        .bind(&dto.address)
        .bind(&dto.city)
        .bind(&dto.state)
        .bind(&dto.zipcode)
        .bind(dto.is_open)
        .bind(dto.donations_needed)
        .bind(dto.donations_acquired)
        .execute(db)
        .await?;

        if let Some(specialties) = &dto.specialties {
            sqlx::query("DELETE FROM org_specialties WHERE org_id = $1")
                .bind(org_id)
                .execute(db)
                .await?;
            Self::set_specialties(db, org_id, specialties).await?;
        }

        Self::fetch_by_id(db, org_id).await
    }

    #[instrument(skip(db))]
    pub async fn delete(db: &PgPool, org_id: Uuid, caller_id: Uuid) -> Result<(), AppError> {
        Self::require_owner(db, org_id, caller_id, "Cannot delete org you do not own").await?;

        sqlx::query("DELETE FROM orgs WHERE id = $1")
            .bind(org_id)
            .execute(db)
            .await?;

        Ok(())
    }

    async fn require_owner(
        db: &PgPool,
        org_id: Uuid,
        caller_id: Uuid,
        denial: &'static str,
    ) -> Result<(), AppError> {
        let owner_id: Option<Uuid> =
            sqlx::query_scalar("SELECT owner_id FROM orgs WHERE id = $1")
                .bind(org_id)
                .fetch_optional(db)
                .await?;

        let owner_id = owner_id.ok_or_else(|| AppError::not_found("Org not found"))?;

        if owner_id != caller_id {
            return Err(AppError::unauthorized(denial));
        }

        Ok(())
    }

    async fn fetch_by_id(db: &PgPool, org_id: Uuid) -> Result<OrgResponse, AppError> {
        Self::get_by_id(db, org_id)
            .await?
            .ok_or_else(|| AppError::not_found("Org not found"))
    }

    async fn set_specialties(
        db: &PgPool,
        org_id: Uuid,
        specialty_ids: &[Uuid],
    ) -> Result<(), AppError> {
        for specialty_id in specialty_ids {
            sqlx::query(
                "INSERT INTO org_specialties (org_id, specialty_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(org_id)
            .bind(specialty_id)
            .execute(db)
            .await?;
        }

        Ok(())
    }

    async fn specialties_for(
        db: &PgPool,
        org_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Specialty>>, AppError> {
        if org_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, OrgSpecialtyRow>(
            "SELECT os.org_id, s.id, s.name, s.code, s.created_at, s.updated_at
             FROM org_specialties os
             JOIN specialties s ON s.id = os.specialty_id
             WHERE os.org_id = ANY($1)
             ORDER BY s.code",
        )
        .bind(org_ids)
        .fetch_all(db)
        .await?;

        let mut by_org: HashMap<Uuid, Vec<Specialty>> = HashMap::new();
        for row in rows {
            by_org.entry(row.org_id).or_default().push(Specialty {
                id: row.id,
                name: row.name,
                code: row.code,
                created_at: row.created_at,
                updated_at: row.updated_at,
            });
        }

        Ok(by_org)
    }
}

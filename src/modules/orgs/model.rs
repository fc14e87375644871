use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::modules::specialties::model::Specialty;

/// Shown when an organization has no stored image.
pub const DEFAULT_ORG_IMAGE_URL: &str = "https://via.placeholder.com/300x200";

#[derive(FromRow, Debug, Clone)]
pub struct OrgRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_public_id: String,
    pub public_id: String,
    pub name: String,
    pub org_image_url: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub is_open: bool,
    pub donations_needed: i32,
    pub donations_acquired: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct OrgResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_public_id: String,
    pub public_id: String,
    pub name: String,
    pub org_image_url: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub is_open: bool,
    pub donations_needed: i32,
    pub donations_acquired: i32,
    pub specialties: Vec<Specialty>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrgResponse {
    pub fn from_row(row: OrgRow, specialties: Vec<Specialty>) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            owner_public_id: row.owner_public_id,
            public_id: row.public_id,
            name: row.name,
            org_image_url: row
                .org_image_url
                .unwrap_or_else(|| DEFAULT_ORG_IMAGE_URL.to_string()),
            phone: row.phone,
            address: row.address,
            city: row.city,
            state: row.state,
            zipcode: row.zipcode,
            is_open: row.is_open,
            donations_needed: row.donations_needed,
            donations_acquired: row.donations_acquired,
            specialties,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateOrgDto {
    #[validate(length(min = 1, message = "Missing organization name"))]
    pub name: String,
    pub org_image_url: Option<String>,
    #[serde(default)]
    pub specialties: Vec<Uuid>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    #[serde(default)]
    pub is_open: bool,
    #[serde(default)]
    pub donations_needed: i32,
    #[serde(default)]
    pub donations_acquired: i32,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateOrgDto {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    pub org_image_url: Option<String>,
    pub specialties: Option<Vec<Uuid>>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub is_open: Option<bool>,
    pub donations_needed: Option<i32>,
    pub donations_acquired: Option<i32>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Shown when a profile has no stored image.
pub const DEFAULT_PROFILE_IMAGE_URL: &str = "https://via.placeholder.com/150";

/// Profile row joined with the owning org's name.
#[derive(FromRow, Debug, Clone)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_available: bool,
    pub profile_image_url: Option<String>,
    pub org_id: Option<Uuid>,
    pub org_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_available: bool,
    pub profile_image_url: String,
    pub org_id: Option<Uuid>,
    pub org_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for ProfileResponse {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            title: row.title,
            email: row.email,
            phone: row.phone,
            is_available: row.is_available,
            profile_image_url: row
                .profile_image_url
                .unwrap_or_else(|| DEFAULT_PROFILE_IMAGE_URL.to_string()),
            org_id: row.org_id,
            org_name: row.org_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct CreateProfileDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub is_available: bool,
    pub profile_image_url: Option<String>,
    pub org_id: Option<Uuid>,
}

#[derive(Deserialize, Debug, Clone, Validate, ToSchema)]
pub struct UpdateProfileDto {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_available: Option<bool>,
    pub profile_image_url: Option<String>,
    pub org_id: Option<Uuid>,
}

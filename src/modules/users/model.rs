use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Public view of an account. The internal `id` never leaves the backend
/// in URLs; external references use `public_id`.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub public_id: String,
    pub org_public_id: Option<String>,
}

/// Full account row as stored. `public_id` is optional because accounts
/// created before public identifiers existed are back-filled lazily at
/// login.
#[derive(FromRow, Debug, Clone)]
pub struct AccountRow {
    pub id: Uuid,
    pub email: String,
    pub password: String,
    pub public_id: Option<String>,
    pub org_public_id: Option<String>,
}

impl AccountRow {
    /// Promote to the public view once a public identifier is guaranteed.
    pub fn into_user(self, public_id: String) -> User {
        User {
            id: self.id,
            email: self.email,
            public_id,
            org_public_id: self.org_public_id,
        }
    }
}

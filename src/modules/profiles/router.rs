use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_profile, delete_profile, get_profile, get_profile_by_public_id, update_profile,
};

pub fn init_profiles_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_profile))
        .route("/by-public-id/{public_id}", get(get_profile_by_public_id))
        .route(
            "/{user_id}",
            get(get_profile).patch(update_profile).delete(delete_profile),
        )
}

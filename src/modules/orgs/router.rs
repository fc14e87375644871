use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{create_org, delete_org, get_org, list_orgs, update_org};

pub fn init_orgs_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_org).get(list_orgs))
        .route("/{id}", get(get_org).patch(update_org).delete(delete_org))
}

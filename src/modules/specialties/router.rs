use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::list_specialties;

pub fn init_specialties_router() -> Router<AppState> {
    Router::new().route("/", get(list_specialties))
}

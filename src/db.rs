use crate::config::cookies::CookieConfig;
use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::jwt::JwtConfig;
use crate::state::AppState;

pub async fn init_app_state() -> AppState {
    let db = init_db_pool().await;

    AppState {
        db,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        cookie_config: CookieConfig::from_env(),
    }
}

use sqlx::PgPool;

use crate::config::cookies::CookieConfig;
use crate::config::cors::CorsConfig;
use crate::config::jwt::JwtConfig;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub cookie_config: CookieConfig,
}

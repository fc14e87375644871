use std::env;

/// Flags applied to the `TOKEN` and `REFRESH_TOKEN` cookies.
///
/// Both cookies are http-only. `Secure` is required in production because
/// the frontend is served from a different origin and browsers only accept
/// `SameSite=None` cookies over HTTPS.
#[derive(Clone, Debug)]
pub struct CookieConfig {
    pub secure: bool,
}

impl CookieConfig {
    pub fn from_env() -> Self {
        let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Self {
            secure: environment == "production",
        }
    }
}

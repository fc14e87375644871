use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use outreach::config::cookies::CookieConfig;
use outreach::config::cors::CorsConfig;
use outreach::config::jwt::JwtConfig;
use outreach::router::init_router;
use outreach::state::AppState;
use sqlx::PgPool;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes";

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        access_token_expiry: 604800,
        refresh_token_expiry: 2592000,
    }
}

pub fn setup_test_app(pool: PgPool) -> Router {
    let state = AppState {
        db: pool,
        jwt_config: test_jwt_config(),
        cors_config: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
        cookie_config: CookieConfig { secure: false },
    };
    init_router(state)
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Pull a cookie value out of the response's Set-Cookie headers.
#[allow(dead_code)]
pub fn extract_cookie(response: &Response<Body>, name: &str) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie| {
            let (pair, _) = cookie.split_once(';').unwrap_or((cookie, ""));
            let (cookie_name, cookie_value) = pair.split_once('=')?;
            (cookie_name.trim() == name).then(|| cookie_value.trim().to_string())
        })
        .filter(|value| !value.is_empty())
}

/// Register a fresh account; returns (email, access token, refresh token).
#[allow(dead_code)]
pub async fn register_account(app: &Router, password: &str) -> (String, String, String) {
    let email = generate_unique_email();
    let request = json_request(
        "POST",
        "/api/auth/register",
        &serde_json::json!({ "email": email, "password": password }),
    );

    let response = tower::ServiceExt::oneshot(app.clone(), request).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    let refresh_token = extract_cookie(&response, "REFRESH_TOKEN").unwrap();
    let body = response_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();

    (email, token, refresh_token)
}

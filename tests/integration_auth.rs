mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use common::{
    extract_cookie, generate_unique_email, json_request, register_account, response_json,
    setup_test_app, test_jwt_config,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use outreach::utils::jwt::verify_token;
use serde::Serialize;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

#[sqlx::test(migrations = "./migrations")]
async fn test_register_creates_account_with_public_id(pool: PgPool) {
    let app = setup_test_app(pool);
    let email = generate_unique_email();

    let request = json_request(
        "POST",
        "/api/auth/register",
        &json!({ "email": email, "password": "Secret123" }),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(extract_cookie(&response, "TOKEN").is_some());
    assert!(extract_cookie(&response, "REFRESH_TOKEN").is_some());

    let body = response_json(response).await;
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], email);

    let public_id = body["user"]["public_id"].as_str().unwrap();
    assert_eq!(public_id.len(), 8);
    assert!(public_id.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_duplicate_email_rejected(pool: PgPool) {
    let app = setup_test_app(pool);
    let email = generate_unique_email();
    let payload = json!({ "email": email, "password": "Secret123" });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/auth/register", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request("POST", "/api/auth/register", &payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_short_password_rejected(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            &json!({ "email": generate_unique_email(), "password": "short" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_reissues_token_with_same_public_id(pool: PgPool) {
    let app = setup_test_app(pool);
    let (email, register_token, _) = register_account(&app, "Secret123").await;

    // Access tokens embed issued-at in seconds; cross the boundary so the
    // login token differs from the register one.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": email, "password": "Secret123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let login_token = body["token"].as_str().unwrap().to_string();

    assert_ne!(login_token, register_token);

    let jwt_config = test_jwt_config();
    let register_claims = verify_token(&register_token, &jwt_config).unwrap();
    let login_claims = verify_token(&login_token, &jwt_config).unwrap();

    assert_eq!(register_claims.public_id, login_claims.public_id);
    assert_eq!(register_claims.sub, login_claims.sub);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_unknown_email_is_not_found(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": "nobody@test.com", "password": "whatever1" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_wrong_password_is_bad_request(pool: PgPool) {
    let app = setup_test_app(pool);
    let (email, _, _) = register_account(&app, "Secret123").await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": email, "password": "WrongPass1" }),
        ))
        .await
        .unwrap();

    // Deliberately distinct from the unknown-email 404.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_protected_route_missing_token(pool: PgPool) {
    let app = setup_test_app(pool);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout-all")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_protected_route_invalid_token(pool: PgPool) {
    let app = setup_test_app(pool);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout-all")
        .header("authorization", "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_protected_route_rejects_legacy_token(pool: PgPool) {
    let app = setup_test_app(pool);

    #[derive(Serialize)]
    struct LegacyClaims {
        sub: String,
        exp: usize,
        iat: usize,
    }

    let now = Utc::now().timestamp() as usize;
    let legacy_token = encode(
        &Header::default(),
        &LegacyClaims {
            sub: Uuid::new_v4().to_string(),
            exp: now + 3600,
            iat: now,
        },
        &EncodingKey::from_secret(test_jwt_config().secret.as_bytes()),
    )
    .unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout-all")
        .header("authorization", format!("Bearer {legacy_token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_access_token_accepted_from_cookie(pool: PgPool) {
    let app = setup_test_app(pool);
    let (_, token, _) = register_account(&app, "Secret123").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout-all")
        .header("cookie", format!("TOKEN={token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_rotates_and_rejects_replay(pool: PgPool) {
    let app = setup_test_app(pool);
    let (_, _, refresh_token) = register_account(&app, "Secret123").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            &json!({ "refreshToken": refresh_token }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let rotated = extract_cookie(&response, "REFRESH_TOKEN").unwrap();
    assert_ne!(rotated, refresh_token);

    let body = response_json(response).await;
    assert!(body["token"].as_str().is_some());

    // The consumed token must never be exchangeable again.
    let replay = app
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            &json!({ "refreshToken": refresh_token }),
        ))
        .await
        .unwrap();

    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_reads_cookie_fallback(pool: PgPool) {
    let app = setup_test_app(pool);
    let (_, _, refresh_token) = register_account(&app, "Secret123").await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .header("cookie", format!("REFRESH_TOKEN={refresh_token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_without_token(pool: PgPool) {
    let app = setup_test_app(pool);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/refresh")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_unknown_token(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            &json!({ "refreshToken": "0".repeat(80) }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_logout_revokes_and_is_idempotent(pool: PgPool) {
    let app = setup_test_app(pool);
    let (_, _, refresh_token) = register_account(&app, "Secret123").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/logout",
            &json!({ "refreshToken": refresh_token }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Revoked tokens are gone for good.
    let refresh = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            &json!({ "refreshToken": refresh_token }),
        ))
        .await
        .unwrap();
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);

    // Revoking again is a no-op, not an error.
    let again = app
        .oneshot(json_request(
            "POST",
            "/api/auth/logout",
            &json!({ "refreshToken": refresh_token }),
        ))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_logout_all_ends_every_session(pool: PgPool) {
    let app = setup_test_app(pool);
    let (email, token, first_refresh) = register_account(&app, "Secret123").await;

    // Second session for the same account.
    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": email, "password": "Secret123" }),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    let second_refresh = extract_cookie(&login, "REFRESH_TOKEN").unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/logout-all")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for refresh_token in [first_refresh, second_refresh] {
        let refresh = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/refresh",
                &json!({ "refreshToken": refresh_token }),
            ))
            .await
            .unwrap();
        assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_full_session_lifecycle(pool: PgPool) {
    let app = setup_test_app(pool);
    let jwt_config = test_jwt_config();

    // Register.
    let (email, register_token, _) = register_account(&app, "Secret123").await;
    let register_claims = verify_token(&register_token, &jwt_config).unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    // Login: fresh access token, same public identifier.
    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": email, "password": "Secret123" }),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    let login_refresh = extract_cookie(&login, "REFRESH_TOKEN").unwrap();
    let login_body = response_json(login).await;
    let login_token = login_body["token"].as_str().unwrap().to_string();

    assert_ne!(login_token, register_token);
    let login_claims = verify_token(&login_token, &jwt_config).unwrap();
    assert_eq!(login_claims.public_id, register_claims.public_id);

    // Refresh: new access token, old refresh token dead.
    let refresh = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            &json!({ "refreshToken": login_refresh }),
        ))
        .await
        .unwrap();
    assert_eq!(refresh.status(), StatusCode::OK);
    let rotated_refresh = extract_cookie(&refresh, "REFRESH_TOKEN").unwrap();
    let refresh_body = response_json(refresh).await;
    assert!(refresh_body["token"].as_str().is_some());

    let replay = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            &json!({ "refreshToken": login_refresh }),
        ))
        .await
        .unwrap();
    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);

    // Logout: the rotated token dies too.
    let logout = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/logout",
            &json!({ "refreshToken": rotated_refresh }),
        ))
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::OK);

    let after_logout = app
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            &json!({ "refreshToken": rotated_refresh }),
        ))
        .await
        .unwrap();
    assert_eq!(after_logout.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_expired_refresh_token_is_deleted_on_sight(pool: PgPool) {
    use outreach::modules::auth::refresh::RefreshTokenStore;

    let app = setup_test_app(pool.clone());
    let (_, _, live_token) = register_account(&app, "Secret123").await;

    let record = RefreshTokenStore::verify(&pool, &live_token).await.unwrap();
    assert!(record.is_some());

    // Plant a token that expired yesterday.
    let stale_token = "f".repeat(80);
    let user_id = record.unwrap().user_id;
    sqlx::query(
        "INSERT INTO refresh_tokens (user_id, token, expires_at)
         VALUES ($1, $2, now() - interval '1 day')",
    )
    .bind(user_id)
    .bind(&stale_token)
    .execute(&pool)
    .await
    .unwrap();

    let record = RefreshTokenStore::verify(&pool, &stale_token).await.unwrap();
    assert!(record.is_none());

    // Lazy expiry removed the row, not just hid it.
    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM refresh_tokens WHERE token = $1")
            .bind(&stale_token)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(remaining, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_with_expired_token_is_rejected_and_purged(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let (_, token, _) = register_account(&app, "Secret123").await;

    let jwt_config = test_jwt_config();
    let claims = verify_token(&token, &jwt_config).unwrap();
    let user_id = Uuid::parse_str(&claims.sub).unwrap();

    let stale_token = "e".repeat(80);
    sqlx::query(
        "INSERT INTO refresh_tokens (user_id, token, expires_at)
         VALUES ($1, $2, now() - interval '1 day')",
    )
    .bind(user_id)
    .bind(&stale_token)
    .execute(&pool)
    .await
    .unwrap();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/refresh",
            &json!({ "refreshToken": stale_token }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The rejection also cleaned the expired row out of the store.
    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM refresh_tokens WHERE token = $1")
            .bind(&stale_token)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(remaining, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_concurrent_registrations_get_distinct_public_ids(pool: PgPool) {
    let app = setup_test_app(pool);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let request = json_request(
                "POST",
                "/api/auth/register",
                &json!({ "email": generate_unique_email(), "password": "Secret123" }),
            );
            let response = app.oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
            let body = response_json(response).await;
            body["user"]["public_id"].as_str().unwrap().to_string()
        }));
    }

    let mut public_ids = std::collections::HashSet::new();
    for handle in handles {
        public_ids.insert(handle.await.unwrap());
    }

    assert_eq!(public_ids.len(), 10);
}

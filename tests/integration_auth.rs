mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{create_test_user, generate_unique_email, setup_test_app};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;

async fn post_login(app: &Router, email: &str, password: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "email": email,
                "password": password
            }))
            .unwrap(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    (status, body)
}

async fn post_bearer(app: &Router, uri: &str, token: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    (status, body)
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_success(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, "testpass123").await;

    let app = setup_test_app(pool);

    let (status, body) = post_login(&app, &email, "testpass123").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("access_token").is_some());
    assert_eq!(body["token_type"], "bearer");
    // JWT_TTL_MINUTES (60 in the test config) reported in seconds
    assert_eq!(body["expires_in"], 3600);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, "testpass123").await;

    let app = setup_test_app(pool);

    let (status, body) = post_login(&app, &email, "wrongpass").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("error").is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_unknown_email(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, body) = post_login(&app, "nonexistent@test.com", "whatever1").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("error").is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_failure_bodies_are_identical(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, "testpass123").await;

    let app = setup_test_app(pool);

    let (_, unknown_body) = post_login(&app, "nonexistent@test.com", "testpass123").await;
    let (_, wrong_body) = post_login(&app, &email, "wrongpass").await;

    assert_eq!(unknown_body, wrong_body);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_invalid_email_format(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, _) = post_login(&app, "not-an-email", "password123").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_empty_password(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, _) = post_login(&app, "test@test.com", "").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_missing_password(pool: PgPool) {
    let app = setup_test_app(pool);

    let request = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({ "email": "test@test.com" })).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_info_returns_logged_in_user(pool: PgPool) {
    let email = generate_unique_email();
    let user = create_test_user(&pool, &email, "testpass123").await;

    let app = setup_test_app(pool);

    let (_, login_body) = post_login(&app, &email, "testpass123").await;
    let token = login_body["access_token"].as_str().unwrap();

    let (status, body) = post_bearer(&app, "/auth/user-info", token).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], user.id.to_string());
    assert_eq!(body["email"], email);
    // the stored hash must never appear in the response
    assert!(body.get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_info_without_token(pool: PgPool) {
    let app = setup_test_app(pool);

    let request = Request::builder()
        .method("POST")
        .uri("/auth/user-info")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_info_with_malformed_header(pool: PgPool) {
    let app = setup_test_app(pool);

    let request = Request::builder()
        .method("POST")
        .uri("/auth/user-info")
        .header("authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_info_with_garbage_token(pool: PgPool) {
    let app = setup_test_app(pool);

    let (status, _) = post_bearer(&app, "/auth/user-info", "invalid.token.here").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_logout_then_user_info_fails(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, "testpass123").await;

    let app = setup_test_app(pool);

    let (_, login_body) = post_login(&app, &email, "testpass123").await;
    let token = login_body["access_token"].as_str().unwrap();

    // token works before logout
    let (status, _) = post_bearer(&app, "/auth/user-info", token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_bearer(&app, "/auth/logout", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully logged out");

    // and is rejected afterwards
    let (status, _) = post_bearer(&app, "/auth/user-info", token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_second_logout_fails(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, "testpass123").await;

    let app = setup_test_app(pool);

    let (_, login_body) = post_login(&app, &email, "testpass123").await;
    let token = login_body["access_token"].as_str().unwrap();

    let (status, _) = post_bearer(&app, "/auth/logout", token).await;
    assert_eq!(status, StatusCode::OK);

    // verify-first semantics: the revoked token no longer authenticates
    let (status, _) = post_bearer(&app, "/auth/logout", token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_returns_new_token_and_revokes_old(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, "testpass123").await;

    let app = setup_test_app(pool);

    let (_, login_body) = post_login(&app, &email, "testpass123").await;
    let old_token = login_body["access_token"].as_str().unwrap();

    let (status, refresh_body) = post_bearer(&app, "/auth/refresh", old_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refresh_body["token_type"], "bearer");
    assert_eq!(refresh_body["expires_in"], 3600);

    let new_token = refresh_body["access_token"].as_str().unwrap();
    assert_ne!(new_token, old_token);

    // new token is usable
    let (status, body) = post_bearer(&app, "/auth/user-info", new_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], email);

    // old token is not
    let (status, _) = post_bearer(&app, "/auth/user-info", old_token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_same_token_twice_fails(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, "testpass123").await;

    let app = setup_test_app(pool);

    let (_, login_body) = post_login(&app, &email, "testpass123").await;
    let token = login_body["access_token"].as_str().unwrap();

    let (status, _) = post_bearer(&app, "/auth/refresh", token).await;
    assert_eq!(status, StatusCode::OK);

    // the first refresh spent the token
    let (status, _) = post_bearer(&app, "/auth/refresh", token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_after_logout_fails(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, "testpass123").await;

    let app = setup_test_app(pool);

    let (_, login_body) = post_login(&app, &email, "testpass123").await;
    let token = login_body["access_token"].as_str().unwrap();

    let (status, _) = post_bearer(&app, "/auth/logout", token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_bearer(&app, "/auth/refresh", token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_without_token(pool: PgPool) {
    let app = setup_test_app(pool);

    let request = Request::builder()
        .method("POST")
        .uri("/auth/refresh")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_user_info_for_deleted_user(pool: PgPool) {
    let email = generate_unique_email();
    let user = create_test_user(&pool, &email, "testpass123").await;

    let app = setup_test_app(pool.clone());

    let (_, login_body) = post_login(&app, &email, "testpass123").await;
    let token = login_body["access_token"].as_str().unwrap();

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let (status, _) = post_bearer(&app, "/auth/user-info", token).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// The end-to-end scenario: login, user-info, logout, user-info again.
#[sqlx::test(migrations = "./migrations")]
async fn test_full_session_lifecycle(pool: PgPool) {
    create_test_user(&pool, "a@b.com", "correct").await;

    let app = setup_test_app(pool);

    let (status, login_body) = post_login(&app, "a@b.com", "correct").await;
    assert_eq!(status, StatusCode::OK);
    let token = login_body["access_token"].as_str().unwrap();

    let (status, body) = post_bearer(&app, "/auth/user-info", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@b.com");

    let (status, _) = post_bearer(&app, "/auth/logout", token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_bearer(&app, "/auth/user-info", token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

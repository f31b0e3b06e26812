use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use serde_json::Value as JsonValue;
use tower::ServiceExt;
use uuid::Uuid;

fn setup_config() {
    dotenvy::dotenv().ok();
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("DATABASE_URL", "postgres://localhost/placement_test");
    env::set_var("JWT_SECRET", "test_secret_key");
    env::set_var("JWT_EXPIRY_HOURS", "24");
    env::set_var("SMTP_HOST", "smtp.example.com");
    env::set_var("SMTP_USERNAME", "mailer");
    env::set_var("SMTP_PASSWORD", "mailer_pass");
    env::set_var("SMTP_FROM", "noreply@placement.test");
    env::set_var("PUBLIC_BASE_URL", "http://localhost:8080");
    let _ = placement_backend::config::init_config();
}

async fn whoami(
    axum::Extension(claims): axum::Extension<placement_backend::middleware::auth::Claims>,
) -> axum::Json<JsonValue> {
    axum::Json(serde_json::json!({ "sub": claims.sub, "role": claims.role }))
}

fn admin_only_router() -> Router {
    Router::new().route("/protected", get(whoami)).layer(
        axum::middleware::from_fn(placement_backend::middleware::auth::require_admin),
    )
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    setup_config();
    let app = admin_only_router();

    let req = Request::builder()
        .method("GET")
        .uri("/protected")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_bearer_scheme_is_unauthorized() {
    setup_config();
    let app = admin_only_router();

    let req = Request::builder()
        .method("GET")
        .uri("/protected")
        .header("Authorization", "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    setup_config();
    let app = admin_only_router();

    let req = Request::builder()
        .method("GET")
        .uri("/protected")
        .header("Authorization", "Bearer not.a.jwt")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_role_is_forbidden() {
    setup_config();
    let app = admin_only_router();

    let token =
        placement_backend::utils::token::issue_token(Uuid::new_v4(), "student").expect("token");
    let req = Request::builder()
        .method("GET")
        .uri("/protected")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn matching_role_passes_and_claims_are_attached() {
    setup_config();
    let app = admin_only_router();

    let user_id = Uuid::new_v4();
    let token = placement_backend::utils::token::issue_token(user_id, "admin").expect("token");
    let req = Request::builder()
        .method("GET")
        .uri("/protected")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["sub"], user_id.to_string());
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn role_check_is_case_insensitive() {
    setup_config();
    let app = admin_only_router();

    let token = placement_backend::utils::token::issue_token(Uuid::new_v4(), "Admin").expect("token");
    let req = Request::builder()
        .method("GET")
        .uri("/protected")
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

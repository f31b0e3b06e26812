use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use placement_backend::error::Error;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

async fn status_for(err: fn() -> Error) -> (StatusCode, JsonValue) {
    let app = Router::new().route(
        "/fail",
        get(move || async move { Result::<(), Error>::Err(err()) }),
    );
    let req = Request::builder()
        .method("GET")
        .uri("/fail")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body: JsonValue = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}

#[tokio::test]
async fn error_variants_map_to_their_http_statuses() {
    let (status, body) = status_for(|| Error::BadRequest("bad input".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "bad input");

    let (status, _) = status_for(|| Error::Unauthorized("no token".into())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = status_for(|| Error::Forbidden("wrong role".into())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = status_for(|| Error::NotFound("missing".into())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = status_for(|| Error::Conflict("duplicate application".into())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "duplicate application");
}

#[tokio::test]
async fn internal_errors_never_leak_details() {
    let (status, body) = status_for(|| Error::Internal("connection string was x".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "An unexpected error occurred");
}

use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// The SPA is served from a different origin than the API, so the browser
/// preflights every JSON request.
pub fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers(Any)
        .allow_origin(Any)
}

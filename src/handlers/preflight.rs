use crate::cors::cors_headers;
use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};

/// Answer a cross-origin pre-flight: 204, CORS headers, no body
pub async fn handle_preflight() -> Response {
    (StatusCode::NO_CONTENT, cors_headers()).into_response()
}

/// Anything the router does not know. Pre-flights are still honoured on
/// every path; the rest get a bare 404.
pub async fn handle_fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        handle_preflight().await
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

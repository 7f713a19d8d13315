use std::time::Duration;

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::dto::ErrorResponse;

/// Fails a request with 408 once it runs longer than `server.request_timeout`.
pub async fn request_timeout_middleware(
    State(limit): State<Duration>,
    request: Request,
    next: Next,
) -> Response {
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(timeout_ms = limit.as_millis() as u64, "Request timed out");
            (
                StatusCode::REQUEST_TIMEOUT,
                Json(ErrorResponse::new("REQUEST_TIMEOUT", "Request timeout")),
            )
                .into_response()
        }
    }
}

//! Router configuration for the API.

use std::time::Duration;

use axum::{
    Router,
    http::{Method, header},
    middleware,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};

use crate::api::handlers;
use crate::api::middleware::{
    global_error_handler, logging_middleware, request_id_middleware, request_timeout_middleware,
};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Layers run outermost first:
/// 1. Request ID
/// 2. Logging
/// 3. Error rewriting
/// 4. Request timeout
/// 5. CORS and compression
///
/// # Routes
/// - `/api/notifications/welcome` - on-demand welcome trigger
/// - `/health`, `/health/ready`, `/health/live` - probes
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let api_routes = Router::new().nest(
        "/notifications",
        handlers::notifications::notification_routes(state.clone()),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .nest("/api", api_routes)
        .merge(handlers::health::health_routes())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(middleware::from_fn_with_state(
            request_timeout,
            request_timeout_middleware,
        ))
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

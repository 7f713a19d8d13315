//! On-demand notification trigger.

use axum::{
    Extension, Json, Router, extract::State, middleware, routing::post,
};

use crate::api::middleware::caller_identity_middleware;
use crate::error::AppResult;
use crate::models::{CallerIdentity, WelcomeResult};
use crate::state::AppState;

/// Creates notification routes.
///
/// Routes:
/// - POST /welcome - send the welcome notification to the caller
pub fn notification_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/welcome", post(trigger_welcome))
        .route_layer(middleware::from_fn_with_state(
            state,
            caller_identity_middleware,
        ))
}

/// POST /api/notifications/welcome
///
/// Anonymous calls get 401 before any directory read. Authenticated calls
/// get `{ "success": bool, "message"?: string }`.
pub async fn trigger_welcome(
    State(state): State<AppState>,
    caller: Option<Extension<CallerIdentity>>,
) -> AppResult<Json<WelcomeResult>> {
    let caller = caller.map(|Extension(identity)| identity);
    let result = state.dispatcher.trigger_welcome(caller.as_ref()).await?;
    Ok(Json(result))
}

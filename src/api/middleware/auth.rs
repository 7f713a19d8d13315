//! Caller identity middleware.
//!
//! Resolves the bearer token on a request into a [`CallerIdentity`] and
//! stores it in request extensions. Rejection of anonymous calls is left
//! to the handler, so the dispatcher decides what "unauthenticated" means.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::models::CallerIdentity;
use crate::state::AppState;
use crate::utils::jwt::validate_access_token;

/// Bearer token from the Authorization header, if any.
pub(crate) fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Attaches a [`CallerIdentity`] when the request carries a valid token.
///
/// A missing or rejected token leaves the request anonymous; the reason
/// is logged at debug level.
///
/// # Example
/// ```ignore
/// Router::new()
///     .route("/welcome", post(handler))
///     .layer(middleware::from_fn_with_state(state.clone(), caller_identity_middleware))
/// ```
pub async fn caller_identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = match bearer_token(&request) {
        Some(token) => match validate_access_token(
            token,
            &state.jwt_config.secret,
            state.jwt_config.leeway_seconds,
        ) {
            Ok(claims) => Some(CallerIdentity::new(claims.sub)),
            Err(e) => {
                tracing::debug!(error = %e, "Bearer token rejected");
                None
            }
        },
        None => None,
    };

    if let Some(identity) = identity {
        request.extensions_mut().insert(identity);
    }

    next.run(request).await
}

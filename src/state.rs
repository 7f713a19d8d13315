//! Application state for Axum web framework.
//!
//! Contains the shared dispatcher and resources that are accessible
//! across all request handlers.

use std::sync::Arc;

use crate::config::JwtConfig;
use crate::db::AsyncDbPool;
use crate::services::Dispatcher;

/// Application state shared by every handler.
///
/// Cloning is cheap: the dispatcher sits behind an `Arc` and the pool is
/// reference counted internally.
#[derive(Clone)]
pub struct AppState {
    /// Dispatcher shared with the scheduled triggers
    pub dispatcher: Arc<Dispatcher>,
    /// Direct access to the database connection pool, used by readiness checks
    pub db_pool: AsyncDbPool,
    /// Verification settings for caller bearer tokens
    pub jwt_config: JwtConfig,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>, db_pool: AsyncDbPool, jwt_config: JwtConfig) -> Self {
        Self {
            dispatcher,
            db_pool,
            jwt_config,
        }
    }
}

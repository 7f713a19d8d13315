//! Data transfer objects for API responses.

mod error;
mod health;

pub use error::ErrorResponse;
pub use health::{ComponentHealth, HealthResponse, HealthStatus};

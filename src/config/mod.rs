//! Configuration management module for nudge-rs
//!
//! Layered loading, lowest to highest priority:
//! 1. `default.toml` - Base default configuration
//! 2. `{environment}.toml` - Environment-specific configuration
//! 3. `local.toml` - Local overrides (not committed to version control)
//! 4. `NUDGE_*` environment variables

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    DatabaseConfig, FcmSettings, JobsConfig, JwtConfig, LoggerSettings, NotificationsConfig,
    PushProviderKind, ScheduleSettings, ServerConfig, Settings, TruncateLength,
};

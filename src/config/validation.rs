//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use std::collections::HashSet;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseConfig, FileSettings, JobsConfig, LoggerSettings, NotificationsConfig,
    PushProviderKind, ServerConfig, Settings,
};

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// Upper bound on deliveries in flight within one cycle
const MAX_CONCURRENCY_LIMIT: usize = 1024;

impl ServerConfig {
    /// Validate server configuration
    ///
    /// # Validation Rules
    /// - Port must be between 1 and 65535
    /// - Request timeout must be greater than 0
    /// - Keep-alive timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::validation(
                "server.port",
                "Port must be between 1 and 65535. Please specify a valid port number.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "server.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        if self.keep_alive_timeout == 0 {
            return Err(ConfigError::validation(
                "server.keep_alive_timeout",
                "Keep-alive timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl DatabaseConfig {
    /// Validate database configuration
    ///
    /// # Validation Rules
    /// - URL must be a non-empty PostgreSQL connection string
    /// - Min and max connections must be greater than 0
    /// - Min connections must not exceed max connections
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Database URL is required. Set database.url or NUDGE_DATABASE__URL.",
            ));
        }

        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ConfigError::validation(
                "database.url",
                "Invalid database URL format. Expected format: postgres://[user:password@]host[:port]/database",
            ));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::validation(
                "database.max_connections",
                "Max connections must be greater than 0.",
            ));
        }

        if self.min_connections == 0 {
            return Err(ConfigError::validation(
                "database.min_connections",
                "Min connections must be greater than 0.",
            ));
        }

        if self.min_connections > self.max_connections {
            return Err(ConfigError::ValidationError {
                field: "database.min_connections".to_string(),
                message: format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                ),
            });
        }

        if self.connection_timeout == 0 {
            return Err(ConfigError::validation(
                "database.connection_timeout",
                "Connection timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        if self.enabled && self.rotation.max_size == 0 {
            return Err(ConfigError::validation(
                "logger.file.rotation.max_size",
                "Rotation size must be greater than 0 bytes.",
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Level must be a level name or a valid filter directive
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.level.trim().is_empty() || EnvFilter::try_new(&self.level).is_err() {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Use trace, debug, info, warn, error or a filter directive.",
                    self.level
                ),
            });
        }

        self.file.validate()?;

        Ok(())
    }
}

impl JobsConfig {
    /// Validate the schedule table
    ///
    /// Cron syntax is checked when the triggers are registered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();

        for (index, schedule) in self.schedules.iter().enumerate() {
            if schedule.name.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    field: format!("jobs.schedules[{}].name", index),
                    message: "Schedule name cannot be empty.".to_string(),
                });
            }

            if schedule.cron.split_whitespace().count() != 6 {
                return Err(ConfigError::ValidationError {
                    field: format!("jobs.schedules[{}].cron", index),
                    message: format!(
                        "Cron expression '{}' must have six fields (sec min hour day month weekday).",
                        schedule.cron
                    ),
                });
            }

            if !names.insert(schedule.name.as_str()) {
                return Err(ConfigError::ValidationError {
                    field: format!("jobs.schedules[{}].name", index),
                    message: format!("Duplicate schedule name '{}'.", schedule.name),
                });
            }
        }

        Ok(())
    }
}

impl NotificationsConfig {
    /// Validate delivery settings
    ///
    /// # Validation Rules
    /// - Max concurrency must be between 1 and 1024
    /// - Truncate length, when enabled, must be greater than 0
    /// - The FCM provider needs a credentials file that exists
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(ConfigError::ValidationError {
                field: "notifications.max_concurrency".to_string(),
                message: format!(
                    "Max concurrency must be between 1 and {}.",
                    MAX_CONCURRENCY_LIMIT
                ),
            });
        }

        if self.truncate_length.limit() == Some(0) {
            return Err(ConfigError::validation(
                "notifications.truncate_length",
                "Truncate length must be greater than 0, or \"disabled\".",
            ));
        }

        if self.provider == PushProviderKind::Fcm {
            let credentials = self.fcm.credentials_file.trim();
            if credentials.is_empty() {
                return Err(ConfigError::validation(
                    "notifications.fcm.credentials_file",
                    "A service-account credentials file is required for the fcm provider.",
                ));
            }
            if !Path::new(credentials).is_file() {
                return Err(ConfigError::ValidationError {
                    field: "notifications.fcm.credentials_file".to_string(),
                    message: format!("Credentials file '{}' does not exist.", credentials),
                });
            }
            if self.fcm.request_timeout == 0 {
                return Err(ConfigError::validation(
                    "notifications.fcm.request_timeout",
                    "Request timeout must be greater than 0 seconds.",
                ));
            }
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// Returns the first validation error encountered. JWT settings are
    /// checked by `serve` only, since `dispatch` and `migrate` never verify
    /// caller tokens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logger.validate()?;
        self.jobs.validate()?;
        self.notifications.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{ScheduleSettings, TruncateLength};
    use crate::models::NotificationMode;

    fn valid_database_config() -> DatabaseConfig {
        DatabaseConfig {
            url: "postgres://localhost/nudge".to_string(),
            ..Default::default()
        }
    }

    fn valid_settings() -> Settings {
        Settings {
            database: valid_database_config(),
            ..Default::default()
        }
    }

    // ========================================================================
    // ServerConfig validation tests
    // ========================================================================

    #[test]
    fn test_server_config_valid() {
        assert!(ServerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_server_config_invalid_port_zero() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        let result = config.validate();
        assert!(
            matches!(result, Err(ConfigError::ValidationError { field, .. }) if field == "server.port")
        );
    }

    #[test]
    fn test_server_config_invalid_timeouts() {
        let config = ServerConfig {
            request_timeout: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig {
            keep_alive_timeout: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    // ========================================================================
    // DatabaseConfig validation tests
    // ========================================================================

    #[test]
    fn test_database_config_valid() {
        assert!(valid_database_config().validate().is_ok());

        let config = DatabaseConfig {
            url: "postgresql://user:pass@db:5432/nudge".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_config_empty_url() {
        let result = DatabaseConfig::default().validate();
        assert!(
            matches!(result, Err(ConfigError::ValidationError { field, .. }) if field == "database.url")
        );
    }

    #[test]
    fn test_database_config_rejects_non_postgres_url() {
        let config = DatabaseConfig {
            url: "mysql://localhost/nudge".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_config_min_exceeds_max() {
        let config = DatabaseConfig {
            max_connections: 2,
            min_connections: 5,
            ..valid_database_config()
        };
        let result = config.validate();
        assert!(
            matches!(result, Err(ConfigError::ValidationError { field, .. }) if field == "database.min_connections")
        );
    }

    // ========================================================================
    // LoggerSettings validation tests
    // ========================================================================

    #[test]
    fn test_logger_settings_valid_levels_and_directives() {
        for level in ["trace", "debug", "info", "warn", "error", "nudge_rs=debug,info"] {
            let settings = LoggerSettings {
                level: level.to_string(),
                ..Default::default()
            };
            assert!(settings.validate().is_ok(), "level {} should be valid", level);
        }
    }

    #[test]
    fn test_logger_settings_invalid_level() {
        let settings = LoggerSettings {
            level: String::new(),
            ..Default::default()
        };
        assert!(
            matches!(settings.validate(), Err(ConfigError::ValidationError { field, .. }) if field == "logger.level")
        );
    }

    #[test]
    fn test_logger_settings_file_enabled_empty_path() {
        let settings = LoggerSettings {
            file: FileSettings {
                enabled: true,
                path: "  ".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(
            matches!(settings.validate(), Err(ConfigError::ValidationError { field, .. }) if field == "logger.file.path")
        );
    }

    #[test]
    fn test_logger_settings_invalid_format() {
        let settings = LoggerSettings {
            file: FileSettings {
                format: "yaml".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    // ========================================================================
    // JobsConfig validation tests
    // ========================================================================

    #[test]
    fn test_jobs_config_default_valid() {
        assert!(JobsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_jobs_config_rejects_five_field_cron() {
        let jobs = JobsConfig {
            schedules: vec![ScheduleSettings::new(
                "morning",
                "0 9 * * *",
                NotificationMode::Motivation,
            )],
            ..Default::default()
        };
        assert!(
            matches!(jobs.validate(), Err(ConfigError::ValidationError { field, .. }) if field == "jobs.schedules[0].cron")
        );
    }

    #[test]
    fn test_jobs_config_rejects_duplicate_names() {
        let jobs = JobsConfig {
            schedules: vec![
                ScheduleSettings::new("daily", "0 0 9 * * *", NotificationMode::Motivation),
                ScheduleSettings::new("daily", "0 0 20 * * *", NotificationMode::Reminder),
            ],
            ..Default::default()
        };
        assert!(
            matches!(jobs.validate(), Err(ConfigError::ValidationError { field, .. }) if field == "jobs.schedules[1].name")
        );
    }

    // ========================================================================
    // NotificationsConfig validation tests
    // ========================================================================

    #[test]
    fn test_notifications_config_default_valid() {
        assert!(NotificationsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_notifications_config_concurrency_bounds() {
        let config = NotificationsConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = NotificationsConfig {
            max_concurrency: MAX_CONCURRENCY_LIMIT + 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_notifications_config_zero_truncate_length() {
        let config = NotificationsConfig {
            truncate_length: TruncateLength::chars(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = NotificationsConfig {
            truncate_length: TruncateLength::disabled(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_notifications_config_fcm_requires_credentials() {
        let mut config = NotificationsConfig {
            provider: PushProviderKind::Fcm,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.fcm.credentials_file = "/nonexistent/firebase.json".to_string();
        assert!(config.validate().is_err());

        let key = tempfile::NamedTempFile::new().unwrap();
        config.fcm.credentials_file = key.path().display().to_string();
        assert!(config.validate().is_ok());
    }

    // ========================================================================
    // Settings validation tests
    // ========================================================================

    #[test]
    fn test_settings_valid() {
        assert!(valid_settings().validate().is_ok());
    }

    #[test]
    fn test_settings_reports_first_invalid_section() {
        let mut settings = valid_settings();
        settings.server.port = 0;
        settings.notifications.max_concurrency = 0;
        assert!(
            matches!(settings.validate(), Err(ConfigError::ValidationError { field, .. }) if field == "server.port")
        );

        let mut settings = valid_settings();
        settings.notifications.max_concurrency = 0;
        assert!(
            matches!(settings.validate(), Err(ConfigError::ValidationError { field, .. }) if field == "notifications.max_concurrency")
        );
    }

    #[test]
    fn test_settings_missing_database_url() {
        let settings = Settings::default();
        assert!(
            matches!(settings.validate(), Err(ConfigError::ValidationError { field, .. }) if field == "database.url")
        );
    }
}

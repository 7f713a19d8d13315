//! Configuration settings structures for nudge-rs
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig, RotationConfig};
use crate::models::NotificationMode;

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "nudge-rs".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_keep_alive_timeout() -> u64 {
    75
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/nudge.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_max_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_max_files() -> usize {
    5
}

fn default_leeway_seconds() -> u64 {
    60
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Keep-alive timeout in seconds
    #[serde(default = "default_keep_alive_timeout")]
    pub keep_alive_timeout: u64,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            keep_alive_timeout: default_keep_alive_timeout(),
        }
    }
}

// ============================================================================
// Database Configuration
// ============================================================================

/// User directory connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[serde(default)]
    pub url: String,

    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,

    /// Whether to automatically run pending migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout: default_connection_timeout(),
            auto_migrate: false,
        }
    }
}

// ============================================================================
// JWT Configuration
// ============================================================================

/// Verification settings for caller identity tokens.
///
/// Tokens are issued by the app's auth backend; this service only checks the
/// HS256 signature and expiry and reads the `sub` claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Shared HS256 secret (set through `NUDGE_JWT__SECRET`)
    #[serde(default)]
    pub secret: String,

    /// Clock skew tolerated when checking `exp`, in seconds
    #[serde(default = "default_leeway_seconds")]
    pub leeway_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            leeway_seconds: default_leeway_seconds(),
        }
    }
}

impl JwtConfig {
    /// Validates the JWT configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::validation(
                "jwt.secret",
                "JWT secret cannot be empty",
            ));
        }

        if self.secret.len() < 32 {
            return Err(ConfigError::validation(
                "jwt.secret",
                "JWT secret should be at least 32 characters for security",
            ));
        }

        if self.leeway_seconds > 600 {
            return Err(ConfigError::validation(
                "jwt.leeway_seconds",
                "Leeway above 600 seconds defeats token expiry",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// Size-based rotation settings for file logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationSettings {
    /// Maximum file size in bytes before rotation
    #[serde(default = "default_max_size")]
    pub max_size: u64,

    /// Maximum number of rotated files to keep
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Whether to gzip rotated files
    #[serde(default)]
    pub compress: bool,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            max_size: default_max_size(),
            max_files: default_max_files(),
            compress: false,
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    /// Whether file output is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Path to the log file
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Whether to append to existing file
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Rotation settings
    #[serde(default)]
    pub rotation: RotationSettings,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
            rotation: RotationSettings::default(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level or filter directive, e.g. "info" or "nudge_rs=debug,info"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output settings
    #[serde(default)]
    pub console: ConsoleSettings,

    /// File output settings
    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert the file representation into the runtime [`LoggerConfig`].
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let console = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file = self.file.into_file_config()?;

        LoggerConfig::new(console, file, self.level)
            .map_err(|e| ConfigError::validation("logger".to_string(), e.to_string()))
    }
}

impl FileSettings {
    /// Convert FileSettings to FileConfig
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let format = self.format.parse::<LogFormat>().map_err(|e| {
            ConfigError::validation("logger.file.format".to_string(), e.to_string())
        })?;
        let rotation = RotationConfig::new(
            self.rotation.max_size,
            self.rotation.max_files,
            self.rotation.compress,
        )
        .map_err(|e| ConfigError::validation("logger.file.rotation".to_string(), e.to_string()))?;

        FileConfig::new(
            self.enabled,
            PathBuf::from(self.path),
            self.append,
            format,
            rotation,
        )
        .map_err(|e| ConfigError::validation("logger.file".to_string(), e.to_string()))
    }
}

// ============================================================================
// Jobs Configuration
// ============================================================================

fn default_jobs_enabled() -> bool {
    true
}

fn default_job_timeout() -> u64 {
    540
}

fn default_schedules() -> Vec<ScheduleSettings> {
    vec![
        ScheduleSettings::new("morning_motivation", "0 0 9 * * *", NotificationMode::Motivation),
        ScheduleSettings::new("midday_reminder", "0 0 12 * * *", NotificationMode::Reminder),
        ScheduleSettings::new("evening_motivation", "0 0 17 * * *", NotificationMode::Motivation),
        ScheduleSettings::new("night_reminder", "0 0 20 * * *", NotificationMode::Reminder),
    ]
}

/// One time-based trigger: a cron expression (UTC, with seconds) bound to a mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// Name used in logs
    pub name: String,

    /// Six-field cron expression evaluated in UTC
    pub cron: String,

    /// Content category for the cycle
    pub mode: NotificationMode,
}

impl ScheduleSettings {
    pub fn new(name: &str, cron: &str, mode: NotificationMode) -> Self {
        Self {
            name: name.to_string(),
            cron: cron.to_string(),
            mode,
        }
    }
}

/// Scheduled dispatch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Whether the cron triggers run inside `serve`
    #[serde(default = "default_jobs_enabled")]
    pub enabled: bool,

    /// Upper bound for a single cycle in seconds, 0 disables the limit
    #[serde(default = "default_job_timeout")]
    pub job_timeout: u64,

    /// Time-based triggers
    #[serde(default = "default_schedules")]
    pub schedules: Vec<ScheduleSettings>,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            enabled: default_jobs_enabled(),
            job_timeout: default_job_timeout(),
            schedules: default_schedules(),
        }
    }
}

// ============================================================================
// Notifications Configuration
// ============================================================================

fn default_max_concurrency() -> usize {
    32
}

fn default_fcm_endpoint() -> String {
    "https://fcm.googleapis.com".to_string()
}

fn default_fcm_request_timeout() -> u64 {
    30
}

/// Push backend used by the delivery gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PushProviderKind {
    /// Firebase Cloud Messaging HTTP v1
    Fcm,
    /// Writes each payload to the log instead of sending it
    #[default]
    Log,
}

impl fmt::Display for PushProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushProviderKind::Fcm => f.write_str("fcm"),
            PushProviderKind::Log => f.write_str("log"),
        }
    }
}

/// Maximum display length for user motivations.
///
/// Written in TOML either as a character count (`truncate_length = 120`) or as
/// `truncate_length = "disabled"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncateLength(Option<usize>);

impl TruncateLength {
    pub const DISABLED_KEYWORD: &'static str = "disabled";

    pub fn chars(limit: usize) -> Self {
        Self(Some(limit))
    }

    pub fn disabled() -> Self {
        Self(None)
    }

    pub fn limit(&self) -> Option<usize> {
        self.0
    }
}

impl Default for TruncateLength {
    fn default() -> Self {
        Self::chars(120)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum TruncateLengthRepr {
    Chars(usize),
    Keyword(String),
}

impl Serialize for TruncateLength {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(limit) => TruncateLengthRepr::Chars(limit),
            None => TruncateLengthRepr::Keyword(Self::DISABLED_KEYWORD.to_string()),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TruncateLength {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match TruncateLengthRepr::deserialize(deserializer)? {
            TruncateLengthRepr::Chars(limit) => Ok(Self::chars(limit)),
            TruncateLengthRepr::Keyword(word) => {
                let word = word.trim();
                if word.eq_ignore_ascii_case(Self::DISABLED_KEYWORD) {
                    Ok(Self::disabled())
                } else if let Ok(limit) = word.parse::<usize>() {
                    Ok(Self::chars(limit))
                } else {
                    Err(serde::de::Error::custom(format!(
                        "truncate_length must be a number or \"{}\", got \"{}\"",
                        Self::DISABLED_KEYWORD,
                        word
                    )))
                }
            }
        }
    }
}

/// Firebase Cloud Messaging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FcmSettings {
    /// Firebase project id, taken from the credentials file when empty
    #[serde(default)]
    pub project_id: String,

    /// Path to the service-account JSON key
    #[serde(default)]
    pub credentials_file: String,

    /// API base URL
    #[serde(default = "default_fcm_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_fcm_request_timeout")]
    pub request_timeout: u64,
}

impl Default for FcmSettings {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            credentials_file: String::new(),
            endpoint: default_fcm_endpoint(),
            request_timeout: default_fcm_request_timeout(),
        }
    }
}

/// Delivery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Push backend
    #[serde(default)]
    pub provider: PushProviderKind,

    /// Deliveries in flight at once within one cycle
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Display limit for user motivations
    #[serde(default)]
    pub truncate_length: TruncateLength,

    /// FCM settings, required when `provider = "fcm"`
    #[serde(default)]
    pub fcm: FcmSettings,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            provider: PushProviderKind::default(),
            max_concurrency: default_max_concurrency(),
            truncate_length: TruncateLength::default(),
            fcm: FcmSettings::default(),
        }
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Application information
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Caller token verification
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,

    /// Scheduled dispatch configuration
    #[serde(default)]
    pub jobs: JobsConfig,

    /// Delivery configuration
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

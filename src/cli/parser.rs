//! CLI argument parsing with clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::models::NotificationMode;

/// Scheduled push-notification dispatcher
#[derive(Parser, Debug)]
#[command(name = "nudge-rs")]
#[command(about = "Scheduled push-notification dispatcher for habit reminders")]
#[command(long_about = "
nudge-rs sends motivation and reminder push notifications to opted-in users
on a fixed daily schedule, and a welcome notification on demand.

EXAMPLES:
    # Start the HTTP server and the daily schedule
    nudge-rs serve

    # Serve the welcome endpoint only, without scheduled cycles
    nudge-rs serve --no-scheduler

    # Check configuration without starting anything
    nudge-rs serve --dry-run

    # Run one reminder cycle now
    nudge-rs dispatch --mode reminder

    # Run one motivation cycle, logging messages instead of sending them
    nudge-rs dispatch --mode motivation --dry-run

    # Apply or preview database migrations
    nudge-rs migrate
    nudge-rs migrate --dry-run
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load this single TOML file instead of the layered `config/` directory.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects the `{environment}.toml` overlay instead of `NUDGE_APP_ENV`.
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server and the scheduled dispatch cycles (default)
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = super::validation::validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        #[arg(short, long, value_name = "PORT", value_parser = super::validation::validate_port)]
        port: Option<u16>,

        /// Log level applied once the server has started
        ///
        /// Overrides the configuration file and the global --verbose/--quiet flags.
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,

        /// Do not register the scheduled dispatch cycles
        #[arg(long)]
        no_scheduler: bool,
    },
    /// Run a single dispatch cycle and print its report
    Dispatch {
        /// Content category for this cycle
        #[arg(short, long, value_enum)]
        mode: DispatchMode,

        /// Log the notifications instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
    /// Database migration operations
    Migrate {
        /// Show pending migrations without applying
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Number of migrations to roll back
        #[arg(long, value_name = "STEPS", conflicts_with = "dry_run", value_parser = super::validation::validate_rollback_steps)]
        rollback: Option<u32>,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

/// Dispatch mode options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchMode {
    Motivation,
    Reminder,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

impl From<DispatchMode> for NotificationMode {
    fn from(mode: DispatchMode) -> Self {
        match mode {
            DispatchMode::Motivation => NotificationMode::Motivation,
            DispatchMode::Reminder => NotificationMode::Reminder,
        }
    }
}

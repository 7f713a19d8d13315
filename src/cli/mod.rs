//! Command-line interface
//!
//! - Argument parsing with clap
//! - Merging CLI overrides onto layered configuration
//! - Handlers for `serve`, `dispatch` and `migrate`

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, DispatchMode, Environment, LogLevel};

use crate::config::error::ConfigError;
use crate::config::settings::Settings;
use crate::logger::{LogLevelHandle, init_logger};

/// Load configuration files and apply CLI overrides, validating the result.
pub fn load_and_merge_config(cli: &Cli) -> Result<Settings, ConfigError> {
    ConfigurationMerger::from_cli(cli)?.merge_cli_args(cli)
}

/// Install the global logger described by `settings.logger`.
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<LogLevelHandle> {
    let logger_config = settings.logger.clone().into_logger_config()?;
    Ok(init_logger(logger_config)?)
}

//! Dispatches a parsed command to its handler.

use super::handlers::{
    DispatchCommandHandler, MigrateCommandHandler, ServeCommandHandler, ServeOptions,
};
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::logger::LogLevelHandle;

/// Execute the command in `cli` with merged `settings`.
///
/// No subcommand means `serve` with default flags.
pub async fn execute_command(
    cli: &Cli,
    settings: Settings,
    log_handle: Option<LogLevelHandle>,
) -> AppResult<()> {
    match &cli.command {
        Some(Commands::Serve {
            log_level,
            dry_run,
            no_scheduler,
            ..
        }) => {
            let options = ServeOptions {
                dry_run: *dry_run,
                scheduler: !*no_scheduler,
                log_level: log_level.map(|level| level.as_str().to_string()),
            };
            ServeCommandHandler::new(settings, log_handle)
                .execute(options)
                .await
        }
        None => {
            let options = ServeOptions {
                scheduler: true,
                ..Default::default()
            };
            ServeCommandHandler::new(settings, log_handle)
                .execute(options)
                .await
        }
        Some(Commands::Dispatch { mode, dry_run }) => {
            DispatchCommandHandler::new(settings)
                .execute((*mode).into(), *dry_run)
                .await
        }
        Some(Commands::Migrate { dry_run, rollback }) => {
            MigrateCommandHandler::new(settings)
                .execute(*dry_run, *rollback)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn create_valid_config() -> Settings {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/nudge_test".to_string();
        config.jwt.secret = "a-test-secret-that-is-long-enough-123".to_string();
        config
    }

    #[tokio::test]
    async fn test_execute_serve_dry_run() {
        let cli = Cli::try_parse_from(["nudge-rs", "serve", "--dry-run"]).unwrap();
        assert!(execute_command(&cli, create_valid_config(), None).await.is_ok());
    }

    #[tokio::test]
    async fn test_execute_migrate_invalid_database_url() {
        let cli = Cli::try_parse_from(["nudge-rs", "migrate"]).unwrap();
        let mut config = create_valid_config();
        config.database.url = "not-a-url".to_string();

        assert!(execute_command(&cli, config, None).await.is_err());
    }
}

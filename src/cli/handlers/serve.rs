//! Serve command handler

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::logger::LogLevelHandle;
use crate::server::Server;

/// Flags of the `serve` subcommand that are not configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    pub dry_run: bool,
    pub scheduler: bool,
    pub log_level: Option<String>,
}

/// Handler for the serve command
pub struct ServeCommandHandler {
    config: Settings,
    log_handle: Option<LogLevelHandle>,
}

impl ServeCommandHandler {
    pub fn new(config: Settings, log_handle: Option<LogLevelHandle>) -> Self {
        Self { config, log_handle }
    }

    /// Run the server, or only validate the configuration with `dry_run`.
    pub async fn execute(self, options: ServeOptions) -> AppResult<()> {
        if options.dry_run {
            return self.validate_only();
        }

        if let (Some(level), Some(handle)) = (options.log_level.as_deref(), &self.log_handle)
            && let Err(e) = handle.set_level(level)
        {
            tracing::warn!(error = %e, level = %level, "Ignoring --log-level");
        }

        Server::new(self.config)
            .with_scheduler(options.scheduler)
            .run()
            .await?;
        Ok(())
    }

    /// Validate configuration without starting the server.
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;
        self.config.jwt.validate()?;

        let notifications = &self.config.notifications;
        println!("✓ Configuration is valid");
        println!("✓ Server would bind to: {}", self.config.server.address());
        println!(
            "✓ Push provider: {} (max concurrency {})",
            notifications.provider, notifications.max_concurrency
        );
        match notifications.truncate_length.limit() {
            Some(limit) => println!("✓ Motivations truncated to {} characters", limit),
            None => println!("✓ Motivation truncation disabled"),
        }
        if self.config.jobs.enabled {
            for schedule in &self.config.jobs.schedules {
                println!(
                    "✓ Schedule '{}' at '{}' ({})",
                    schedule.name, schedule.cron, schedule.mode
                );
            }
        } else {
            println!("✓ Scheduled dispatch disabled");
        }

        println!("Dry run completed successfully - configuration is ready for deployment");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

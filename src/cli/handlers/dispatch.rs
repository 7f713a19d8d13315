//! Dispatch command handler
//!
//! Runs one cycle outside the schedule, the same way a cron trigger would.

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::db::establish_async_connection_pool;
use crate::error::AppResult;
use crate::jobs::DispatchRunner;
use crate::models::{DispatchReport, NotificationMode};
use crate::server::build_dispatcher;

/// Name given to manually triggered cycles in logs.
pub const MANUAL_CYCLE_NAME: &str = "manual";

/// Handler for the dispatch command
pub struct DispatchCommandHandler {
    config: Settings,
}

impl DispatchCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Run one cycle for `mode` and print its report.
    ///
    /// With `dry_run` every notification goes to the log provider.
    pub async fn execute(&self, mode: NotificationMode, dry_run: bool) -> AppResult<()> {
        self.config.database.validate()?;

        let pool = establish_async_connection_pool(&self.config.database).await?;
        let dispatcher = Arc::new(build_dispatcher(&self.config, pool, dry_run)?);
        let runner = DispatchRunner::new(dispatcher, self.config.jobs.job_timeout);

        println!("Running {} cycle...", mode);
        let report = runner.run_cycle(MANUAL_CYCLE_NAME, mode).await?;
        print_report(&report);

        Ok(())
    }
}

fn print_report(report: &DispatchReport) {
    println!("✓ {} cycle finished in {} ms", report.mode, report.duration_ms);
    println!("  eligible users:        {}", report.eligible);
    println!("  skipped without token: {}", report.skipped_without_token);
    println!("  delivered:             {}", report.delivered);
    println!("  failed:                {}", report.failed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_dispatch_rejects_invalid_database_url() {
        let mut config = Settings::default();
        config.database.url = "sqlite://nudge.db".to_string();

        let result = DispatchCommandHandler::new(config)
            .execute(NotificationMode::Reminder, true)
            .await;

        match result {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "database.url"),
            other => panic!("Expected database.url validation error, got {:?}", other),
        }
    }
}

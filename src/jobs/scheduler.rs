use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler as TokioCronScheduler};

use crate::jobs::error::{JobError, JobResult};
use crate::jobs::schedule::ScheduledDispatch;
use crate::models::{DispatchReport, NotificationMode};
use crate::services::Dispatcher;

/// Runs one dispatch cycle with an optional upper bound on its duration.
///
/// Shared by the cron triggers and the `dispatch` command.
pub struct DispatchRunner {
    dispatcher: Arc<Dispatcher>,
    timeout: Option<Duration>,
}

impl DispatchRunner {
    /// `timeout_secs == 0` disables the limit.
    pub fn new(dispatcher: Arc<Dispatcher>, timeout_secs: u64) -> Self {
        Self::with_timeout(
            dispatcher,
            (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        )
    }

    pub fn with_timeout(dispatcher: Arc<Dispatcher>, timeout: Option<Duration>) -> Self {
        Self {
            dispatcher,
            timeout,
        }
    }

    pub async fn run_cycle(&self, name: &str, mode: NotificationMode) -> JobResult<DispatchReport> {
        let cycle = self.dispatcher.run(mode);

        let report = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, cycle)
                .await
                .map_err(|_| JobError::Timeout {
                    name: name.to_string(),
                    millis: limit.as_millis() as u64,
                })??,
            None => cycle.await?,
        };

        Ok(report)
    }
}

/// Wrapper around tokio-cron-scheduler holding the dispatch triggers.
///
/// Triggers fire independently; a long cycle does not hold back the next one.
pub struct DispatchScheduler {
    scheduler: Mutex<TokioCronScheduler>,
    runner: Arc<DispatchRunner>,
}

impl DispatchScheduler {
    pub async fn new(runner: Arc<DispatchRunner>) -> JobResult<Self> {
        let scheduler = TokioCronScheduler::new().await?;
        Ok(Self {
            scheduler: Mutex::new(scheduler),
            runner,
        })
    }

    /// Register every trigger. Fails on the first invalid cron expression.
    pub async fn register(&self, triggers: &[ScheduledDispatch]) -> JobResult<()> {
        for trigger in triggers {
            let job = self.build_job(trigger)?;
            self.scheduler.lock().await.add(job).await?;
            tracing::info!(
                name = %trigger.name,
                cron = %trigger.cron,
                mode = %trigger.mode,
                "Registered dispatch trigger"
            );
        }
        Ok(())
    }

    fn build_job(&self, trigger: &ScheduledDispatch) -> JobResult<Job> {
        let runner = Arc::clone(&self.runner);
        let name = trigger.name.clone();
        let mode = trigger.mode;

        Job::new_async(trigger.cron.as_str(), move |_uuid, _lock| {
            let runner = Arc::clone(&runner);
            let name = name.clone();

            Box::pin(async move {
                tracing::info!(name = %name, mode = %mode, "Scheduled dispatch triggered");
                if let Err(e) = runner.run_cycle(&name, mode).await {
                    tracing::error!(name = %name, mode = %mode, error = %e, "Scheduled dispatch failed");
                }
            })
        })
        .map_err(|e| JobError::InvalidCronExpression {
            name: trigger.name.clone(),
            reason: e.to_string(),
        })
    }

    pub async fn start(&self) -> JobResult<()> {
        self.scheduler.lock().await.start().await?;
        tracing::info!("Dispatch scheduler started");
        Ok(())
    }

    pub async fn stop(&self) -> JobResult<()> {
        self.scheduler.lock().await.shutdown().await?;
        tracing::info!("Dispatch scheduler stopped");
        Ok(())
    }
}

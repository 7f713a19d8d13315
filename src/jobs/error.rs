use thiserror::Error;

use crate::error::AppError;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Dispatch cycle '{name}' timed out after {millis}ms")]
    Timeout { name: String, millis: u64 },

    #[error("Invalid cron expression for '{name}': {reason}")]
    InvalidCronExpression { name: String, reason: String },

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Dispatch cycle failed: {0}")]
    Dispatch(#[from] AppError),
}

pub type JobResult<T> = Result<T, JobError>;

impl From<tokio_cron_scheduler::JobSchedulerError> for JobError {
    fn from(error: tokio_cron_scheduler::JobSchedulerError) -> Self {
        JobError::Scheduler(error.to_string())
    }
}

impl From<JobError> for AppError {
    fn from(error: JobError) -> Self {
        match error {
            JobError::Dispatch(inner) => inner,
            JobError::InvalidCronExpression { name, reason } => AppError::Validation {
                field: format!("jobs.schedules.{}", name),
                reason,
            },
            other => AppError::Internal {
                source: anyhow::Error::from(other),
            },
        }
    }
}

//! Scheduled dispatch triggers.

pub mod error;
pub mod schedule;
pub mod scheduler;

pub use error::{JobError, JobResult};
pub use schedule::ScheduledDispatch;
pub use scheduler::{DispatchRunner, DispatchScheduler};

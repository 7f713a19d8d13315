//! Time-based triggers.

use crate::config::{JobsConfig, ScheduleSettings};
use crate::models::NotificationMode;

/// A named cron expression (six fields, UTC) bound to a dispatch mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledDispatch {
    pub name: String,
    pub cron: String,
    pub mode: NotificationMode,
}

impl ScheduledDispatch {
    pub fn new(name: impl Into<String>, cron: impl Into<String>, mode: NotificationMode) -> Self {
        Self {
            name: name.into(),
            cron: cron.into(),
            mode,
        }
    }

    /// The configured trigger table, in configuration order.
    pub fn from_config(config: &JobsConfig) -> Vec<Self> {
        config.schedules.iter().map(Self::from).collect()
    }
}

impl From<&ScheduleSettings> for ScheduledDispatch {
    fn from(settings: &ScheduleSettings) -> Self {
        Self::new(settings.name.clone(), settings.cron.clone(), settings.mode)
    }
}

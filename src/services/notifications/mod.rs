//! Notification dispatch with pluggable push providers.
//!
//! [`Dispatcher`] drives a cycle: recipient query, per-user message
//! selection, bounded fan-out through the [`DeliveryGateway`]. Providers
//! implement [`PushProvider`]; FCM and a log-only provider ship here.

mod dispatcher;
mod fcm_provider;
mod gateway;
mod log_provider;
mod provider;
mod selector;

use std::sync::Arc;

pub use dispatcher::{
    DispatchContext, Dispatcher, NO_TOKEN_MESSAGE, UNAUTHENTICATED_MESSAGE, WELCOME_BODY,
    WELCOME_TITLE,
};
pub use fcm_provider::{FcmProvider, ServiceAccountKey};
pub use gateway::DeliveryGateway;
pub use log_provider::LogProvider;
pub use provider::{PushMessage, PushProvider};
pub use selector::{FALLBACK_MOTIVATION, MessageSelector, REMINDERS};

use crate::config::{NotificationsConfig, PushProviderKind};
use crate::error::AppResult;

/// Build the provider named by `config.provider`.
///
/// `dry_run` forces the log provider whatever is configured.
pub fn build_provider(
    config: &NotificationsConfig,
    dry_run: bool,
) -> AppResult<Arc<dyn PushProvider>> {
    if dry_run {
        tracing::warn!("Dry run: notifications are logged, not sent");
        return Ok(Arc::new(LogProvider::new()));
    }

    Ok(match config.provider {
        PushProviderKind::Fcm => {
            let provider = FcmProvider::new(&config.fcm)?;
            tracing::info!(project_id = %provider.project_id(), "Using FCM push provider");
            Arc::new(provider)
        }
        PushProviderKind::Log => Arc::new(LogProvider::new()),
    })
}

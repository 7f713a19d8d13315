//! Delivery gateway: the per-recipient failure boundary.

use std::sync::Arc;

use super::provider::{PushMessage, PushProvider};
use crate::models::{DeliveryOutcome, NotificationKind};

/// Wraps a [`PushProvider`] so that a failed send becomes a
/// [`DeliveryOutcome::Failed`] instead of an error.
#[derive(Clone)]
pub struct DeliveryGateway {
    provider: Arc<dyn PushProvider>,
}

impl DeliveryGateway {
    pub fn new(provider: Arc<dyn PushProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Send one notification. Never fails; provider errors are logged and
    /// returned as `Failed`.
    pub async fn send(
        &self,
        token: &str,
        title: &str,
        body: &str,
        kind: NotificationKind,
    ) -> DeliveryOutcome {
        let message = PushMessage::new(token, title, body, kind);

        match self.provider.send(&message).await {
            Ok(message_id) => {
                tracing::debug!(
                    provider = self.provider.name(),
                    token = %message.redacted_token(),
                    kind = %kind,
                    message_id = %message_id,
                    "Notification delivered"
                );
                DeliveryOutcome::Delivered { message_id }
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    token = %message.redacted_token(),
                    kind = %kind,
                    error = %e,
                    "Notification delivery failed"
                );
                DeliveryOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use async_trait::async_trait;

    struct RejectingProvider;

    #[async_trait]
    impl PushProvider for RejectingProvider {
        async fn send(&self, _message: &PushMessage) -> AppResult<String> {
            Err(AppError::external("test", "token not registered"))
        }

        fn name(&self) -> &'static str {
            "rejecting"
        }
    }

    #[tokio::test]
    async fn test_gateway_converts_error_to_failed_outcome() {
        let gateway = DeliveryGateway::new(Arc::new(RejectingProvider));
        let outcome = gateway
            .send("tok", "Reminder", "body", NotificationKind::Reminder)
            .await;

        match outcome {
            DeliveryOutcome::Failed { error } => assert!(error.contains("token not registered")),
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_gateway_passes_message_id_through() {
        let gateway = DeliveryGateway::new(Arc::new(crate::services::notifications::LogProvider::new()));
        let outcome = gateway
            .send("tok", "Motivation", "body", NotificationKind::Motivation)
            .await;

        assert_eq!(
            outcome,
            DeliveryOutcome::Delivered {
                message_id: "log/1".to_string()
            }
        );
        assert_eq!(gateway.provider_name(), "log");
    }
}

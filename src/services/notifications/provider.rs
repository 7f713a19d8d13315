//! Push provider abstraction.
//!
//! A provider delivers one message to one device token. Providers return
//! errors rather than swallowing them; isolating failures per recipient is
//! the job of [`DeliveryGateway`](super::DeliveryGateway).

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::AppResult;
use crate::models::NotificationKind;

/// One push notification addressed to one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    pub token: String,
    pub title: String,
    pub body: String,
    pub kind: NotificationKind,
}

impl PushMessage {
    pub fn new(
        token: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        kind: NotificationKind,
    ) -> Self {
        Self {
            token: token.into(),
            title: title.into(),
            body: body.into(),
            kind,
        }
    }

    /// Wire payload: `{ token, notification: { title, body }, data: { type } }`
    pub fn payload(&self) -> Value {
        json!({
            "token": self.token,
            "notification": {
                "title": self.title,
                "body": self.body,
            },
            "data": {
                "type": self.kind.as_str(),
            },
        })
    }

    /// Token prefix safe to put in logs.
    pub fn redacted_token(&self) -> String {
        redact_token(&self.token)
    }
}

pub(crate) fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    if prefix.len() < token.len() {
        format!("{}…", prefix)
    } else {
        prefix
    }
}

/// Single-recipient push backend.
///
/// Uses `async_trait` so the gateway can hold an `Arc<dyn PushProvider>`.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Deliver `message`, returning the provider's message id.
    async fn send(&self, message: &PushMessage) -> AppResult<String>;

    /// Provider name for logs
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let message = PushMessage::new("tok-1", "Reminder", "Log it", NotificationKind::Reminder);
        assert_eq!(
            message.payload(),
            json!({
                "token": "tok-1",
                "notification": { "title": "Reminder", "body": "Log it" },
                "data": { "type": "reminder" }
            })
        );
    }

    #[test]
    fn test_payload_welcome_type() {
        let message = PushMessage::new("t", "Welcome", "Hi", NotificationKind::Welcome);
        assert_eq!(message.payload()["data"]["type"], "welcome");
    }

    #[test]
    fn test_redacted_token() {
        assert_eq!(redact_token("abc"), "abc");
        assert_eq!(redact_token("abcdefghijkl"), "abcdefgh…");
    }
}

//! Provider that records payloads in the log instead of sending them.
//!
//! Used for local runs and `serve --dry-run`.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use super::provider::{PushMessage, PushProvider};
use crate::error::AppResult;

#[derive(Debug, Default)]
pub struct LogProvider {
    sent: AtomicU64,
}

impl LogProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages accepted since construction.
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PushProvider for LogProvider {
    async fn send(&self, message: &PushMessage) -> AppResult<String> {
        let sequence = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        let message_id = format!("log/{}", sequence);

        tracing::info!(
            provider = self.name(),
            token = %message.redacted_token(),
            kind = %message.kind,
            title = %message.title,
            body = %message.body,
            message_id = %message_id,
            "Push notification logged"
        );

        Ok(message_id)
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

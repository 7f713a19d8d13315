//! Dispatch cycles and the on-demand welcome trigger.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};

use super::gateway::DeliveryGateway;
use super::selector::MessageSelector;
use crate::error::{AppError, AppResult};
use crate::models::{
    CallerIdentity, DeliveryOutcome, DispatchReport, NotificationKind, NotificationMode,
    WelcomeResult,
};
use crate::repositories::UserDirectory;

pub const WELCOME_TITLE: &str = "Welcome to LogMySmoke";
pub const WELCOME_BODY: &str = "Remember why you started. We are here to help!";
pub const UNAUTHENTICATED_MESSAGE: &str = "User must be logged in to trigger notifications.";
pub const NO_TOKEN_MESSAGE: &str = "No token found";
pub const WELCOME_FAILED_MESSAGE: &str = "Notification could not be delivered";
pub const USER_LOOKUP_FAILED_MESSAGE: &str = "Could not load user";

/// Handles to the collaborators a dispatcher works against.
///
/// Built once per process and passed in explicitly.
#[derive(Clone)]
pub struct DispatchContext {
    pub directory: Arc<dyn UserDirectory>,
    pub gateway: DeliveryGateway,
}

impl DispatchContext {
    pub fn new(directory: Arc<dyn UserDirectory>, gateway: DeliveryGateway) -> Self {
        Self { directory, gateway }
    }
}

pub struct Dispatcher {
    ctx: DispatchContext,
    selector: MessageSelector,
    max_concurrency: usize,
}

impl Dispatcher {
    pub fn new(ctx: DispatchContext, selector: MessageSelector, max_concurrency: usize) -> Self {
        Self {
            ctx,
            selector,
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn provider_name(&self) -> &'static str {
        self.ctx.gateway.provider_name()
    }

    /// Run one cycle for `mode`.
    ///
    /// A failed recipient query ends the cycle before any delivery. Once
    /// deliveries start, every one of them is awaited regardless of how the
    /// others fare.
    pub async fn run(&self, mode: NotificationMode) -> AppResult<DispatchReport> {
        let started = Instant::now();

        let users = self
            .ctx
            .directory
            .find_notification_enabled()
            .await
            .inspect_err(|e| {
                tracing::error!(mode = %mode, error = %e, "Recipient query failed, cycle aborted");
            })?;

        let recipients: Vec<(String, String)> = users
            .iter()
            .filter(|user| user.notifications_enabled)
            .filter_map(|user| {
                let token = user.delivery_token()?;
                Some((
                    token.to_string(),
                    self.selector.select(mode, &user.motivations),
                ))
            })
            .collect();

        let eligible = users.iter().filter(|u| u.notifications_enabled).count();
        let skipped_without_token = eligible - recipients.len();

        tracing::info!(
            mode = %mode,
            eligible,
            recipients = recipients.len(),
            skipped_without_token,
            "Dispatch cycle started"
        );

        let gateway = &self.ctx.gateway;
        let title = mode.title();
        let kind = mode.kind();
        let outcomes: Vec<DeliveryOutcome> = stream::iter(recipients)
            .map(|(token, body)| async move { gateway.send(&token, title, &body, kind).await })
            .buffer_unordered(self.max_concurrency)
            .collect()
            .await;

        let delivered = outcomes.iter().filter(|o| o.is_delivered()).count();
        let report = DispatchReport {
            mode,
            eligible,
            skipped_without_token,
            delivered,
            failed: outcomes.len() - delivered,
            duration_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            mode = %mode,
            delivered = report.delivered,
            failed = report.failed,
            duration_ms = report.duration_ms,
            "Dispatch cycle finished"
        );

        Ok(report)
    }

    /// Send the welcome notification to the calling user.
    ///
    /// Rejects a missing identity before touching the directory; that is the
    /// only error returned. A failed lookup, a missing token or a failed send
    /// all come back as `success: false`.
    pub async fn trigger_welcome(
        &self,
        caller: Option<&CallerIdentity>,
    ) -> AppResult<WelcomeResult> {
        let caller = caller.ok_or_else(|| AppError::Unauthorized {
            message: UNAUTHENTICATED_MESSAGE.to_string(),
        })?;

        tracing::info!(uid = %caller.uid, "Welcome notification requested");

        let user = match self.ctx.directory.find_by_id(&caller.uid).await {
            Ok(user) => user,
            Err(e) => {
                tracing::error!(
                    uid = %caller.uid,
                    error = %e,
                    "Failed to load user for welcome notification"
                );
                return Ok(WelcomeResult::not_sent(USER_LOOKUP_FAILED_MESSAGE));
            }
        };
        let Some(token) = user.as_ref().and_then(|u| u.delivery_token()) else {
            tracing::info!(uid = %caller.uid, "No token found for user");
            return Ok(WelcomeResult::not_sent(NO_TOKEN_MESSAGE));
        };

        let outcome = self
            .ctx
            .gateway
            .send(token, WELCOME_TITLE, WELCOME_BODY, NotificationKind::Welcome)
            .await;

        Ok(if outcome.is_delivered() {
            WelcomeResult::sent()
        } else {
            WelcomeResult::not_sent(WELCOME_FAILED_MESSAGE)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Subscriber;
    use crate::services::notifications::provider::{PushMessage, PushProvider};
    use crate::services::notifications::selector::{FALLBACK_MOTIVATION, REMINDERS};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeDirectory {
        users: Vec<Subscriber>,
        reads: AtomicUsize,
        fail: bool,
    }

    impl FakeDirectory {
        fn new(users: Vec<Subscriber>) -> Self {
            Self {
                users,
                reads: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::new(vec![])
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        fn check(&self) -> AppResult<()> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::Database {
                    operation: "load users".to_string(),
                    source: anyhow::anyhow!("connection refused"),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserDirectory for FakeDirectory {
        async fn find_notification_enabled(&self) -> AppResult<Vec<Subscriber>> {
            self.check()?;
            Ok(self
                .users
                .iter()
                .filter(|u| u.notifications_enabled)
                .cloned()
                .collect())
        }

        async fn find_by_id(&self, uid: &str) -> AppResult<Option<Subscriber>> {
            self.check()?;
            Ok(self.users.iter().find(|u| u.id == uid).cloned())
        }
    }

    #[derive(Default)]
    struct RecordingProvider {
        sent: Mutex<Vec<PushMessage>>,
        failing_tokens: HashSet<String>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        delay: Option<Duration>,
    }

    impl RecordingProvider {
        fn failing_on(tokens: &[&str]) -> Self {
            Self {
                failing_tokens: tokens.iter().map(|t| t.to_string()).collect(),
                ..Default::default()
            }
        }

        fn messages(&self) -> Vec<PushMessage> {
            self.sent.lock().unwrap().clone()
        }

        fn tokens(&self) -> HashSet<String> {
            self.messages().into_iter().map(|m| m.token).collect()
        }
    }

    #[async_trait]
    impl PushProvider for RecordingProvider {
        async fn send(&self, message: &PushMessage) -> AppResult<String> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            self.sent.lock().unwrap().push(message.clone());
            if self.failing_tokens.contains(&message.token) {
                return Err(AppError::external("test", "invalid registration token"));
            }
            Ok(format!("msg-{}", message.token))
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn user(id: &str, enabled: bool, token: Option<&str>, motivations: &[&str]) -> Subscriber {
        Subscriber {
            id: id.to_string(),
            notifications_enabled: enabled,
            fcm_token: token.map(String::from),
            motivations: motivations.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn dispatcher(
        directory: Arc<FakeDirectory>,
        provider: Arc<RecordingProvider>,
        max_concurrency: usize,
    ) -> Dispatcher {
        let ctx = DispatchContext::new(directory, DeliveryGateway::new(provider));
        Dispatcher::new(ctx, MessageSelector::default(), max_concurrency)
    }

    #[tokio::test]
    async fn test_motivation_cycle_example_directory() {
        let directory = Arc::new(FakeDirectory::new(vec![
            user("A", true, Some("T1"), &["X", "Y"]),
            user("B", true, None, &["Z"]),
            user("C", false, Some("T3"), &["W"]),
        ]));
        let provider = Arc::new(RecordingProvider::default());

        let report = dispatcher(directory, provider.clone(), 8)
            .run(NotificationMode::Motivation)
            .await
            .unwrap();

        let messages = provider.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].token, "T1");
        assert!(messages[0].body == "X" || messages[0].body == "Y");
        assert_eq!(messages[0].title, "Motivation");
        assert_eq!(messages[0].kind, NotificationKind::Motivation);

        assert_eq!(report.eligible, 2);
        assert_eq!(report.skipped_without_token, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.failed, 0);
    }

    #[tokio::test]
    async fn test_disabled_and_tokenless_users_never_receive() {
        let directory = Arc::new(FakeDirectory::new(vec![
            user("off", false, Some("T-off"), &[]),
            user("blank", true, Some("   "), &[]),
            user("empty", true, Some(""), &[]),
            user("none", true, None, &[]),
            user("on", true, Some("T-on"), &[]),
        ]));
        let provider = Arc::new(RecordingProvider::default());

        dispatcher(directory, provider.clone(), 4)
            .run(NotificationMode::Reminder)
            .await
            .unwrap();

        assert_eq!(provider.tokens(), HashSet::from(["T-on".to_string()]));
    }

    #[tokio::test]
    async fn test_disabled_users_filtered_even_if_directory_returns_them() {
        struct LeakyDirectory;

        #[async_trait]
        impl UserDirectory for LeakyDirectory {
            async fn find_notification_enabled(&self) -> AppResult<Vec<Subscriber>> {
                Ok(vec![
                    user("off", false, Some("T-off"), &[]),
                    user("on", true, Some("T-on"), &[]),
                ])
            }

            async fn find_by_id(&self, _uid: &str) -> AppResult<Option<Subscriber>> {
                Ok(None)
            }
        }

        let provider = Arc::new(RecordingProvider::default());
        let ctx = DispatchContext::new(Arc::new(LeakyDirectory), DeliveryGateway::new(provider.clone()));
        let report = Dispatcher::new(ctx, MessageSelector::default(), 4)
            .run(NotificationMode::Reminder)
            .await
            .unwrap();

        assert_eq!(provider.tokens(), HashSet::from(["T-on".to_string()]));
        assert_eq!(report.eligible, 1);
    }

    #[tokio::test]
    async fn test_empty_motivations_use_fallback() {
        let directory = Arc::new(FakeDirectory::new(vec![user("A", true, Some("T1"), &[])]));
        let provider = Arc::new(RecordingProvider::default());

        dispatcher(directory, provider.clone(), 4)
            .run(NotificationMode::Motivation)
            .await
            .unwrap();

        assert_eq!(provider.messages()[0].body, FALLBACK_MOTIVATION);
    }

    #[tokio::test]
    async fn test_reminder_messages_come_from_pool() {
        let users = (0..20)
            .map(|i| user(&format!("u{}", i), true, Some(format!("T{}", i).as_str()), &["mine"]))
            .collect();
        let provider = Arc::new(RecordingProvider::default());

        dispatcher(Arc::new(FakeDirectory::new(users)), provider.clone(), 4)
            .run(NotificationMode::Reminder)
            .await
            .unwrap();

        let messages = provider.messages();
        assert_eq!(messages.len(), 20);
        for message in messages {
            assert!(REMINDERS.contains(&message.body.as_str()));
            assert_eq!(message.title, "Reminder");
            assert_eq!(message.kind, NotificationKind::Reminder);
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_others() {
        let directory = Arc::new(FakeDirectory::new(vec![
            user("A", true, Some("T1"), &[]),
            user("B", true, Some("BAD"), &[]),
            user("C", true, Some("T3"), &[]),
        ]));
        let provider = Arc::new(RecordingProvider::failing_on(&["BAD"]));

        let report = dispatcher(directory, provider.clone(), 1)
            .run(NotificationMode::Reminder)
            .await
            .unwrap();

        assert_eq!(
            provider.tokens(),
            HashSet::from(["T1".to_string(), "BAD".to_string(), "T3".to_string()])
        );
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.attempted(), 3);
    }

    #[tokio::test]
    async fn test_query_failure_aborts_cycle() {
        let directory = Arc::new(FakeDirectory::failing());
        let provider = Arc::new(RecordingProvider::default());

        let result = dispatcher(directory, provider.clone(), 4)
            .run(NotificationMode::Motivation)
            .await;

        assert!(matches!(result, Err(AppError::Database { .. })));
        assert!(provider.messages().is_empty());
    }

    #[tokio::test]
    async fn test_fan_out_respects_concurrency_limit() {
        let users = (0..12)
            .map(|i| user(&format!("u{}", i), true, Some(format!("T{}", i).as_str()), &[]))
            .collect();
        let provider = Arc::new(RecordingProvider {
            delay: Some(Duration::from_millis(5)),
            ..Default::default()
        });

        let report = dispatcher(Arc::new(FakeDirectory::new(users)), provider.clone(), 3)
            .run(NotificationMode::Motivation)
            .await
            .unwrap();

        assert_eq!(report.delivered, 12);
        let peak = provider.max_in_flight.load(Ordering::SeqCst);
        assert!((1..=3).contains(&peak), "peak in flight was {}", peak);
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_clamped() {
        let directory = Arc::new(FakeDirectory::new(vec![]));
        let d = dispatcher(directory, Arc::new(RecordingProvider::default()), 0);
        assert_eq!(d.max_concurrency(), 1);
    }

    #[tokio::test]
    async fn test_welcome_requires_identity_and_skips_directory() {
        let directory = Arc::new(FakeDirectory::new(vec![user("A", true, Some("T1"), &[])]));
        let provider = Arc::new(RecordingProvider::default());
        let d = dispatcher(directory.clone(), provider.clone(), 4);

        let err = d.trigger_welcome(None).await.unwrap_err();

        assert!(
            matches!(err, AppError::Unauthorized { ref message } if message == UNAUTHENTICATED_MESSAGE)
        );
        assert_eq!(directory.reads(), 0);
        assert!(provider.messages().is_empty());
    }

    #[tokio::test]
    async fn test_welcome_without_token() {
        let directory = Arc::new(FakeDirectory::new(vec![user("A", true, None, &[])]));
        let provider = Arc::new(RecordingProvider::default());
        let d = dispatcher(directory, provider.clone(), 4);

        let result = d.trigger_welcome(Some(&CallerIdentity::new("A"))).await.unwrap();
        assert_eq!(result, WelcomeResult::not_sent(NO_TOKEN_MESSAGE));

        let result = d
            .trigger_welcome(Some(&CallerIdentity::new("unknown")))
            .await
            .unwrap();
        assert_eq!(result, WelcomeResult::not_sent(NO_TOKEN_MESSAGE));
        assert!(provider.messages().is_empty());
    }

    #[tokio::test]
    async fn test_welcome_sends_fixed_message() {
        // Opt-out does not apply to the welcome message
        let directory = Arc::new(FakeDirectory::new(vec![user("A", false, Some("T1"), &["X"])]));
        let provider = Arc::new(RecordingProvider::default());
        let d = dispatcher(directory, provider.clone(), 4);

        let result = d.trigger_welcome(Some(&CallerIdentity::new("A"))).await.unwrap();

        assert_eq!(result, WelcomeResult::sent());
        let messages = provider.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].token, "T1");
        assert_eq!(messages[0].title, WELCOME_TITLE);
        assert_eq!(messages[0].body, WELCOME_BODY);
        assert_eq!(messages[0].kind, NotificationKind::Welcome);
    }

    #[tokio::test]
    async fn test_welcome_reports_delivery_failure() {
        let directory = Arc::new(FakeDirectory::new(vec![user("A", true, Some("BAD"), &[])]));
        let provider = Arc::new(RecordingProvider::failing_on(&["BAD"]));
        let d = dispatcher(directory, provider, 4);

        let result = d.trigger_welcome(Some(&CallerIdentity::new("A"))).await.unwrap();
        assert_eq!(result, WelcomeResult::not_sent(WELCOME_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_welcome_lookup_failure_is_reported_not_raised() {
        let directory = Arc::new(FakeDirectory::failing());
        let provider = Arc::new(RecordingProvider::default());
        let d = dispatcher(directory.clone(), provider.clone(), 4);

        let result = d.trigger_welcome(Some(&CallerIdentity::new("A"))).await.unwrap();

        assert_eq!(result, WelcomeResult::not_sent(USER_LOOKUP_FAILED_MESSAGE));
        assert!(!result.success);
        assert_eq!(directory.reads(), 1);
        assert!(provider.messages().is_empty());
    }
}

//! Process wiring: pool, dispatcher, scheduler and HTTP server.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::api::routes::create_router;
use crate::config::settings::Settings;
use crate::db::{AsyncDbPool, establish_async_connection_pool, run_pending_migrations};
use crate::error::AppResult;
use crate::jobs::{DispatchRunner, DispatchScheduler, ScheduledDispatch};
use crate::repositories::UserRepository;
use crate::services::notifications::{
    DeliveryGateway, DispatchContext, Dispatcher, MessageSelector, build_provider,
};
use crate::state::AppState;

/// Build the dispatcher for `settings` on top of `pool`.
///
/// `dry_run` swaps the configured provider for the log provider.
pub fn build_dispatcher(
    settings: &Settings,
    pool: AsyncDbPool,
    dry_run: bool,
) -> AppResult<Dispatcher> {
    let notifications = &settings.notifications;
    let provider = build_provider(notifications, dry_run)?;
    let ctx = DispatchContext::new(
        Arc::new(UserRepository::new(pool)),
        DeliveryGateway::new(provider),
    );

    Ok(Dispatcher::new(
        ctx,
        MessageSelector::new(notifications.truncate_length.limit()),
        notifications.max_concurrency,
    ))
}

/// HTTP server manager
pub struct Server {
    settings: Settings,
    scheduler: bool,
}

impl Server {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            scheduler: true,
        }
    }

    /// Disable the scheduled cycles for this process regardless of `jobs.enabled`.
    pub fn with_scheduler(mut self, enabled: bool) -> Self {
        self.scheduler = enabled;
        self
    }

    /// Start everything and run until Ctrl+C or SIGTERM.
    ///
    /// The scheduler is stopped after the HTTP server has drained.
    pub async fn run(self) -> anyhow::Result<()> {
        let settings = &self.settings;

        tracing::info!(
            app_name = %settings.application.name,
            app_version = %settings.application.version,
            "Application starting"
        );
        tracing::info!(
            host = %settings.server.host,
            port = settings.server.port,
            request_timeout = settings.server.request_timeout,
            keep_alive_timeout = settings.server.keep_alive_timeout,
            "Server configuration loaded"
        );
        tracing::info!(
            max_connections = settings.database.max_connections,
            min_connections = settings.database.min_connections,
            auto_migrate = settings.database.auto_migrate,
            "Database configuration loaded"
        );
        tracing::info!(
            provider = %settings.notifications.provider,
            max_concurrency = settings.notifications.max_concurrency,
            truncate_length = ?settings.notifications.truncate_length.limit(),
            "Notification configuration loaded"
        );

        settings.jwt.validate().map_err(|e| {
            tracing::error!(error = %e, "JWT configuration validation failed");
            anyhow::anyhow!("JWT configuration validation failed: {}", e)
        })?;

        if settings.database.auto_migrate {
            let applied = run_pending_migrations(&settings.database.url).await?;
            tracing::info!(count = applied.len(), "Database migrations applied");
        }

        let pool = establish_async_connection_pool(&settings.database).await?;
        tracing::info!("Database connection pool initialized");

        let dispatcher = Arc::new(build_dispatcher(settings, pool.clone(), false)?);
        tracing::info!(
            provider = dispatcher.provider_name(),
            max_concurrency = dispatcher.max_concurrency(),
            "Dispatcher ready"
        );

        let scheduler = if self.scheduler && settings.jobs.enabled {
            let runner = Arc::new(DispatchRunner::new(
                dispatcher.clone(),
                settings.jobs.job_timeout,
            ));
            let scheduler = DispatchScheduler::new(runner).await?;
            scheduler
                .register(&ScheduledDispatch::from_config(&settings.jobs))
                .await?;
            scheduler.start().await?;
            Some(scheduler)
        } else {
            tracing::info!("Scheduled dispatch disabled for this process");
            None
        };

        let state = AppState::new(dispatcher, pool, settings.jwt.clone());
        let router = create_router(
            state,
            Duration::from_secs(settings.server.request_timeout),
        );

        let address = settings.server.address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!(error = %e, address = %address, "Failed to bind to address");
            anyhow::anyhow!("Failed to bind to {}: {}", address, e)
        })?;
        tracing::info!(address = %address, "Server listening");

        let shutdown = CancellationToken::new();
        tokio::spawn({
            let shutdown = shutdown.clone();
            async move {
                shutdown_signal().await;
                shutdown.cancel();
            }
        });

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await?;

        if let Some(scheduler) = scheduler
            && let Err(e) = scheduler.stop().await
        {
            tracing::warn!(error = %e, "Scheduler did not stop cleanly");
        }

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Resolves on Ctrl+C or SIGTERM.
///
/// A signal whose handler cannot be installed is logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

//! Read access to the user directory.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::db::AsyncDbPool;
use crate::error::AppResult;
use crate::models::Subscriber;

/// Source of notification recipients.
///
/// The dispatcher only depends on this trait, so cycles can run against
/// any store that can answer these two lookups.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// All users with `notifications_enabled = true`, whatever their token state.
    async fn find_notification_enabled(&self) -> AppResult<Vec<Subscriber>>;

    /// A single user record by id.
    async fn find_by_id(&self, uid: &str) -> AppResult<Option<Subscriber>>;
}

/// PostgreSQL-backed directory.
#[derive(Clone)]
pub struct UserRepository {
    pool: AsyncDbPool,
}

impl UserRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_notification_enabled(&self) -> AppResult<Vec<Subscriber>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        let rows = users
            .filter(notifications_enabled.eq(true))
            .select(Subscriber::as_select())
            .load(&mut conn)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, uid: &str) -> AppResult<Option<Subscriber>> {
        use crate::schema::users::dsl::*;
        let mut conn = self.pool.get().await?;

        let row = users
            .filter(id.eq(uid))
            .select(Subscriber::as_select())
            .first(&mut conn)
            .await
            .optional()?;
        Ok(row)
    }
}

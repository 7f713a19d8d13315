use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A row of the user directory as seen by the dispatcher.
///
/// The mobile client owns these rows; this service only ever reads them.
#[derive(Debug, Queryable, Selectable, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Subscriber {
    pub id: String,
    pub notifications_enabled: bool,
    pub fcm_token: Option<String>,
    pub motivations: Vec<String>,
}

impl Subscriber {
    /// Stored delivery token, unless it is missing or blank.
    pub fn delivery_token(&self) -> Option<&str> {
        self.fcm_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }
}

/// Authenticated caller of the on-demand trigger, taken from the bearer token subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub uid: String,
}

impl CallerIdentity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

//! Notification value types shared by the dispatcher, the triggers and the HTTP layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Content category chosen by a trigger for a whole cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMode {
    Motivation,
    Reminder,
}

impl NotificationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationMode::Motivation => "motivation",
            NotificationMode::Reminder => "reminder",
        }
    }

    /// Title shown on the device for this mode.
    pub fn title(&self) -> &'static str {
        match self {
            NotificationMode::Motivation => "Motivation",
            NotificationMode::Reminder => "Reminder",
        }
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            NotificationMode::Motivation => NotificationKind::Motivation,
            NotificationMode::Reminder => NotificationKind::Reminder,
        }
    }
}

impl fmt::Display for NotificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "motivation" => Ok(NotificationMode::Motivation),
            "reminder" => Ok(NotificationMode::Reminder),
            _ => Err(format!(
                "Invalid notification mode '{}'. Valid modes are: motivation, reminder",
                s
            )),
        }
    }
}

/// Value of the `data.type` field carried by every push payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Motivation,
    Reminder,
    Welcome,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Motivation => "motivation",
            NotificationKind::Reminder => "reminder",
            NotificationKind::Welcome => "welcome",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one delivery attempt to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Provider accepted the message and returned this id
    Delivered { message_id: String },
    /// Provider or transport failure, already logged
    Failed { error: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

/// Summary of one dispatch cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub mode: NotificationMode,
    /// Users returned by the recipient query
    pub eligible: usize,
    pub skipped_without_token: usize,
    pub delivered: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Response body of the on-demand welcome trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WelcomeResult {
    pub fn sent() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn not_sent(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("motivation".parse::<NotificationMode>().unwrap(), NotificationMode::Motivation);
        assert_eq!("Reminder".parse::<NotificationMode>().unwrap(), NotificationMode::Reminder);
        assert!("welcome".parse::<NotificationMode>().is_err());
    }

    #[test]
    fn test_mode_serde_lowercase() {
        let json = serde_json::to_string(&NotificationMode::Reminder).unwrap();
        assert_eq!(json, "\"reminder\"");
        let mode: NotificationMode = serde_json::from_str("\"motivation\"").unwrap();
        assert_eq!(mode, NotificationMode::Motivation);
    }

    #[test]
    fn test_mode_titles_and_kinds() {
        assert_eq!(NotificationMode::Motivation.title(), "Motivation");
        assert_eq!(NotificationMode::Reminder.title(), "Reminder");
        assert_eq!(NotificationMode::Motivation.kind(), NotificationKind::Motivation);
        assert_eq!(NotificationMode::Reminder.kind().as_str(), "reminder");
    }

    #[test]
    fn test_welcome_result_serialization() {
        let sent = serde_json::to_value(WelcomeResult::sent()).unwrap();
        assert_eq!(sent, serde_json::json!({ "success": true }));

        let not_sent = serde_json::to_value(WelcomeResult::not_sent("No token found")).unwrap();
        assert_eq!(
            not_sent,
            serde_json::json!({ "success": false, "message": "No token found" })
        );
    }
}

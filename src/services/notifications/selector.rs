//! Per-recipient message selection.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::models::NotificationMode;

/// Fixed pool drawn from in reminder mode.
pub const REMINDERS: [&str; 10] = [
    "Remember to log your cigarette — every log helps you quit!",
    "Quick reminder: log your cigarette intake for today.",
    "Tracking helps: please record any cigarettes you smoked today.",
    "Small step: open LogMySmoke and log your cigarette if you've smoked.",
    "A gentle nudge: don't forget to log your smoking today.",
    "Track the wins: please log any cigarettes today.",
    "Logging keeps you accountable — add your smoke now.",
    "Your progress matters — quickly log your cigarette.",
    "Record it — it helps you beat the habit.",
    "Don't forget to log — your future self will thank you.",
];

/// Sent in motivation mode to users without motivations of their own.
pub const FALLBACK_MOTIVATION: &str = "Keep going — you are doing great!";

/// Marker appended to truncated motivations.
pub const ELLIPSIS: &str = "...";

/// Picks the body of one notification.
///
/// Selection is uniform and stateless; only the distribution is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageSelector {
    truncate: Option<usize>,
}

impl MessageSelector {
    /// `truncate` is the display limit in characters for motivation text,
    /// `None` keeps it whole.
    pub fn new(truncate: Option<usize>) -> Self {
        Self { truncate }
    }

    pub fn truncate_length(&self) -> Option<usize> {
        self.truncate
    }

    pub fn select(&self, mode: NotificationMode, motivations: &[String]) -> String {
        self.select_with(mode, motivations, &mut rand::rng())
    }

    pub fn select_with<R: Rng + ?Sized>(
        &self,
        mode: NotificationMode,
        motivations: &[String],
        rng: &mut R,
    ) -> String {
        match mode {
            NotificationMode::Reminder => REMINDERS
                .choose(rng)
                .copied()
                .unwrap_or(REMINDERS[0])
                .to_string(),
            NotificationMode::Motivation => {
                match motivations.choose(rng) {
                    Some(chosen) => self.truncate(chosen),
                    None => FALLBACK_MOTIVATION.to_string(),
                }
            }
        }
    }

    /// Keep `text` when it fits, else its first `limit` characters plus `...`.
    pub fn truncate(&self, text: &str) -> String {
        match self.truncate {
            Some(limit) if text.chars().count() > limit => {
                let mut cut: String = text.chars().take(limit).collect();
                cut.push_str(ELLIPSIS);
                cut
            }
            _ => text.to_string(),
        }
    }
}

impl Default for MessageSelector {
    fn default() -> Self {
        Self::new(Some(120))
    }
}

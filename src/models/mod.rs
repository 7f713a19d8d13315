mod notification;
mod user;

pub use notification::{
    DeliveryOutcome, DispatchReport, NotificationKind, NotificationMode, WelcomeResult,
};
pub use user::{CallerIdentity, Subscriber};

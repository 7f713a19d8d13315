//! Service layer.

pub mod notifications;

pub use notifications::{DispatchContext, Dispatcher};

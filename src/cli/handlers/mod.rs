//! Command handlers for CLI operations

pub mod dispatch;
pub mod migrate;
pub mod serve;

pub use dispatch::DispatchCommandHandler;
pub use migrate::MigrateCommandHandler;
pub use serve::{ServeCommandHandler, ServeOptions};

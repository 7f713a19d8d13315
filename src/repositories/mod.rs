//! Repository layer for the user directory.

mod user_repo;

pub use user_repo::{UserDirectory, UserRepository};

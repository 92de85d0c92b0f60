/// tododemo library
///
/// A per-user to-do list backed by an on-device SQLite store.

pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod logging;

// Re-exports for convenience
pub use config::Config;
pub use db::Database;
pub use error::{Result, TodoError};

/// Database module for tododemo
///
/// The on-device task store: SQLite through sqlx, one pool per app.

pub mod connection;
pub mod models;
pub mod queries;

pub use connection::Database;
pub use models::*;

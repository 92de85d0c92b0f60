/// Error types for tododemo
///
/// Every failure in the app degrades to "show nothing" or "show a message",
/// so each variant knows how to phrase itself for a transient notification.

use thiserror::Error;

/// Main error type for tododemo operations
#[derive(Error, Debug)]
pub enum TodoError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O errors (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Task data that can't be stored or read back
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for tododemo operations
pub type Result<T> = std::result::Result<T, TodoError>;

impl From<toml::de::Error> for TodoError {
    fn from(err: toml::de::Error) -> Self {
        TodoError::Config(err.to_string())
    }
}

/// Convert TodoError to a user-friendly error message
impl TodoError {
    pub fn user_message(&self) -> String {
        match self {
            TodoError::Database(e) => {
                format!("Could not reach your tasks. Please try again. Details: {}", e)
            }
            TodoError::Io(e) => {
                format!("File system error. Check permissions. Details: {}", e)
            }
            TodoError::Config(msg) => {
                format!("Configuration issue: {}", msg)
            }
            TodoError::Serialization(e) => {
                format!("Data format error: {}", e)
            }
            TodoError::InvalidTask(reason) => {
                format!("Invalid task: {}", reason)
            }
            TodoError::Generic(msg) => msg.clone(),
        }
    }
}

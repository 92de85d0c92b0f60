/// Data models for database entities
///
/// All models map to database tables and use sqlx for type-safe queries.

use crate::error::TodoError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;

/// A task row, always owned by exactly one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub priority: String, // 'low', 'medium', 'high'
    pub time: String,
    pub schedule_date: String,
    pub schedule_time: String,
    pub user_id: i64,
}

impl Task {
    /// Parse the stored priority
    pub fn priority(&self) -> Result<Priority, TodoError> {
        self.priority.parse()
    }
}

/// Input for creating or rewriting a task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub priority: Priority,
    pub time: String,
    pub schedule_date: String,
    pub schedule_time: String,
}

impl NewTask {
    /// A task with only a title, everything else left blank
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            priority: Priority::default(),
            time: String::new(),
            schedule_date: String::new(),
            schedule_time: String::new(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), TodoError> {
        if self.title.trim().is_empty() {
            return Err(TodoError::InvalidTask("title is empty".to_string()));
        }
        Ok(())
    }
}

/// Display name of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl UserProfile {
    /// "First Last", as shown in the screen header
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Priority {
    type Err = TodoError;

    // Lenient: case and surrounding whitespace don't matter
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "normal" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(TodoError::InvalidTask(format!("unknown priority '{}'", other))),
        }
    }
}

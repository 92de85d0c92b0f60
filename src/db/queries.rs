/// SQL query functions for database operations
///
/// Tasks, user profiles and the key-value preferences that back the session.

use crate::db::models::*;
use crate::db::Database;
use crate::error::Result;
use sqlx::Row;
use tracing::{debug, instrument};

impl Database {
    /// Get every task owned by a user, in store order (oldest first)
    ///
    /// An unknown user or a user without tasks yields an empty list.
    #[instrument(skip(self))]
    pub async fn get_tasks(&self, user_id: i64) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, priority, time, schedule_date, schedule_time, user_id
            FROM tasks
            WHERE user_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        debug!(count = tasks.len(), "loaded tasks");
        Ok(tasks)
    }

    /// Get a single task by ID
    pub async fn get_task(&self, task_id: i64) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, title, priority, time, schedule_date, schedule_time, user_id FROM tasks WHERE id = ?",
        )
        .bind(task_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(task)
    }

    /// Create a task for a user
    ///
    /// # Returns
    /// * `Ok(i64)` - The store-assigned task ID
    /// * `Err(TodoError)` - If the title is blank or the user doesn't exist
    #[instrument(skip(self, task), fields(title = %task.title))]
    pub async fn create_task(&self, user_id: i64, task: &NewTask) -> Result<i64> {
        task.validate()?;

        let result = sqlx::query(
            r#"
            INSERT INTO tasks (title, priority, time, schedule_date, schedule_time, user_id)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(task.title.trim())
        .bind(task.priority.to_string())
        .bind(&task.time)
        .bind(&task.schedule_date)
        .bind(&task.schedule_time)
        .bind(user_id)
        .fetch_one(self.pool())
        .await?;

        Ok(result.get(0))
    }

    /// Rewrite every editable field of a task
    ///
    /// Returns `false` when no task has that ID.
    #[instrument(skip(self, task))]
    pub async fn update_task(&self, task_id: i64, task: &NewTask) -> Result<bool> {
        task.validate()?;

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, priority = ?, time = ?, schedule_date = ?, schedule_time = ?
            WHERE id = ?
            "#,
        )
        .bind(task.title.trim())
        .bind(task.priority.to_string())
        .bind(&task.time)
        .bind(&task.schedule_date)
        .bind(&task.schedule_time)
        .bind(task_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a task
    ///
    /// Returns whether a row was actually removed. Deleting a missing ID
    /// is a no-op, not an error.
    #[instrument(skip(self))]
    pub async fn delete_task(&self, task_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task_id)
            .execute(self.pool())
            .await?;

        let deleted = result.rows_affected() > 0;
        debug!(deleted, "delete task");
        Ok(deleted)
    }

    /// Register a user, returning the new user ID
    pub async fn create_user(&self, first_name: &str, last_name: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO users (first_name, last_name) VALUES (?, ?) RETURNING id")
            .bind(first_name)
            .bind(last_name)
            .fetch_one(self.pool())
            .await?;

        Ok(result.get(0))
    }

    /// Get a user's name, or None if the user row is absent
    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: i64) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT id AS user_id, first_name, last_name FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(profile)
    }

    /// Get a preference value
    pub async fn get_preference(&self, namespace: &str, key: &str) -> Result<Option<String>> {
        let value: Option<(String,)> =
            sqlx::query_as("SELECT value FROM preferences WHERE namespace = ? AND key = ?")
                .bind(namespace)
                .bind(key)
                .fetch_optional(self.pool())
                .await?;

        Ok(value.map(|(v,)| v))
    }

    /// Set a preference
    pub async fn set_preference(&self, namespace: &str, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO preferences (namespace, key, value) VALUES (?, ?, ?)")
            .bind(namespace)
            .bind(key)
            .bind(value)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Remove a preference, if set
    pub async fn remove_preference(&self, namespace: &str, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM preferences WHERE namespace = ? AND key = ?")
            .bind(namespace)
            .bind(key)
            .execute(self.pool())
            .await?;

        Ok(())
    }
}

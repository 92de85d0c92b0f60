/// Opening the task store
///
/// One SQLite file per device, shared through a cloneable handle.

use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

// One screen at a time touches the store, a handful is plenty
const MAX_CONNECTIONS: u32 = 5;

/// Handle to the task store. Clones share the pool.
#[derive(Clone)]
pub struct Database {
    pool: Arc<SqlitePool>,
    db_path: PathBuf,
}

impl Database {
    /// Open the store at `db_path`, creating the file and its directory
    /// on first use. Tables are created before this returns.
    ///
    /// # Examples
    /// ```no_run
    /// use tododemo_lib::db::Database;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::new("/tmp/tododemo/tasks.db").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
            .create_if_missing(true)
            .foreign_keys(true)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        let db = Self {
            pool: Arc::new(pool),
            db_path,
        };

        db.initialize_schema().await?;
        info!(path = %db.db_path.display(), "opened task store");

        Ok(db)
    }

    /// Empty store that lives only as long as the handle
    ///
    /// Each `:memory:` connection is a separate database, hence exactly one
    /// connection that is never recycled.
    #[cfg(test)]
    pub async fn new_test() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self {
            pool: Arc::new(pool),
            db_path: PathBuf::from(":memory:"),
        };

        db.initialize_schema().await?;

        Ok(db)
    }

    async fn initialize_schema(&self) -> Result<()> {
        let schema = include_str!("../../database/schema.sql");

        // one statement per query
        for statement in schema.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed).execute(self.pool.as_ref()).await?;
            }
        }

        debug!("schema initialized");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// `:memory:` for test stores
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Wait for in-use connections to come back, then shut the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Row counts and pool state, for `tododemo status`
    pub async fn stats(&self) -> Result<DatabaseStats> {
        let user_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool.as_ref())
            .await?;

        let task_count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(DatabaseStats {
            total_users: user_count.0,
            total_tasks: task_count.0,
            pool_size: self.pool.size(),
            idle_connections: self.pool.num_idle(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub total_users: i64,
    pub total_tasks: i64,
    pub pool_size: u32,
    pub idle_connections: usize,
}

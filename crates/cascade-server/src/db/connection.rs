//! Database connection management
//!
//! Wraps a SQLite pool with schema initialisation and a health check.

use std::sync::Arc;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Type alias for the document store's connection pool
pub type DatabasePool = SqlitePool;

/// Shared database connection
#[derive(Clone)]
pub struct DatabaseConnection {
    pool: Arc<DatabasePool>,
}

impl DatabaseConnection {
    /// Connect to the database behind a small pool
    ///
    /// # Arguments
    /// * `database_url` - SQLite connection string (e.g. `sqlite:cascade.db?mode=rwc`
    ///   or `sqlite::memory:`)
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Create the workflow table if it does not exist yet
    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS workflows (
                id TEXT PRIMARY KEY NOT NULL,
                document TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    /// Verify the database answers a trivial query
    pub async fn health_check(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").fetch_one(self.pool.as_ref()).await?;
        Ok(())
    }
}

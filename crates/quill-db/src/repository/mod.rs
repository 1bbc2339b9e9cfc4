//! Database repository implementation

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tracing::info;

use crate::error::DbError;

// Submodules
mod posts;
mod sessions;
mod users;

const CREATE_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS user (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS post (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        author_id INTEGER NOT NULL,
        created TEXT NOT NULL,
        title TEXT NOT NULL,
        body TEXT NOT NULL,
        FOREIGN KEY (author_id) REFERENCES user (id)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_post_created ON post(created)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS session (
        token TEXT PRIMARY KEY,
        user_id INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES user (id)
    )
    "#,
];

// Children first so the foreign keys never dangle mid-drop.
const DROP_STATEMENTS: &[&str] = &[
    "DROP TABLE IF EXISTS session",
    "DROP TABLE IF EXISTS post",
    "DROP TABLE IF EXISTS user",
];

/// Database connection and operations
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection and make sure the schema exists
    pub async fn new(database_url: &str) -> Result<Self, DbError> {
        info!("Connecting to database: {}", database_url);

        let pool = SqlitePool::connect(database_url).await?;
        let db = Self { pool };
        db.ensure_schema().await?;
        Ok(db)
    }

    /// Open a private in-memory database
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self, DbError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let db = Self { pool };
        db.ensure_schema().await?;
        Ok(db)
    }

    /// Get the underlying pool for advanced usage
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create any missing tables
    async fn ensure_schema(&self) -> Result<(), DbError> {
        info!("Ensuring database schema");

        let mut tx = self.pool.begin().await?;
        for statement in CREATE_STATEMENTS {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        Ok(())
    }

    /// Drop every table and recreate the schema from scratch
    ///
    /// All users, posts and sessions are lost.
    pub async fn reset_schema(&self) -> Result<(), DbError> {
        info!("Resetting database schema");

        let mut tx = self.pool.begin().await?;
        for statement in DROP_STATEMENTS.iter().chain(CREATE_STATEMENTS) {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        tx.commit().await?;

        info!("Database schema initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPost, NewUser};

    #[tokio::test]
    async fn test_reset_schema_clears_rows() {
        let db = Database::in_memory().await.unwrap();
        let user = db
            .insert_user(NewUser {
                username: "alice".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        db.insert_post(NewPost {
            author_id: user.id,
            title: "Hi".to_string(),
            body: "World".to_string(),
        })
        .await
        .unwrap();

        db.reset_schema().await.unwrap();

        assert!(db.get_user_by_username("alice").await.unwrap().is_none());
        assert!(db.list_posts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let db = Database::in_memory().await.unwrap();
        db.ensure_schema().await.unwrap();
        db.ensure_schema().await.unwrap();
    }
}

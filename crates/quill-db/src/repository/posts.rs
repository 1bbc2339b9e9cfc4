//! Post operations

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewPost, Post, PostWithAuthor};
use crate::repository::Database;
use crate::utils::format_timestamp;

const SELECT_POST_WITH_AUTHOR: &str = r#"
    SELECT p.id, p.title, p.body, p.created, p.author_id, u.username
    FROM post p JOIN user u ON p.author_id = u.id
"#;

impl Database {
    // ==================== Post Operations ====================

    /// List every post, newest first
    ///
    /// Posts created within the same microsecond fall back to insertion order,
    /// newest insertion first.
    pub async fn list_posts(&self) -> Result<Vec<PostWithAuthor>, DbError> {
        let sql = format!("{SELECT_POST_WITH_AUTHOR} ORDER BY p.created DESC, p.id DESC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| PostWithAuthor::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Get a post by ID
    pub async fn get_post(&self, id: i64) -> Result<Option<PostWithAuthor>, DbError> {
        let sql = format!("{SELECT_POST_WITH_AUTHOR} WHERE p.id = ?");
        let result = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;

        result
            .map(|row| PostWithAuthor::try_from(&row).map_err(DbError::from))
            .transpose()
    }

    /// Insert a new post stamped with the current server time
    pub async fn insert_post(&self, post: NewPost) -> Result<Post, DbError> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO post (title, body, created, author_id)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&post.title)
        .bind(&post.body)
        .bind(format_timestamp(&now))
        .bind(post.author_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        let id: i64 = result.get("id");

        Ok(Post {
            id,
            title: post.title,
            body: post.body,
            created_at: now,
            author_id: post.author_id,
        })
    }

    /// Overwrite title and body of a post owned by `author_id`
    ///
    /// Returns `false` when no row matched, either because the post is gone
    /// or because it belongs to someone else.
    pub async fn update_post(
        &self,
        id: i64,
        author_id: i64,
        title: &str,
        body: &str,
    ) -> Result<bool, DbError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE post
            SET title = ?, body = ?
            WHERE id = ? AND author_id = ?
            "#,
        )
        .bind(title)
        .bind(body)
        .bind(id)
        .bind(author_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a post owned by `author_id`
    pub async fn delete_post(&self, id: i64, author_id: i64) -> Result<bool, DbError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM post WHERE id = ? AND author_id = ?")
            .bind(id)
            .bind(author_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

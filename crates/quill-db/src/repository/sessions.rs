//! Login session operations

use chrono::Utc;

use crate::error::DbError;
use crate::models::Session;
use crate::utils::format_timestamp;

use super::Database;

impl Database {
    /// Store a new session, discarding `previous` in the same transaction
    pub async fn replace_session(
        &self,
        previous: Option<&str>,
        token: &str,
        user_id: i64,
    ) -> Result<Session, DbError> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        if let Some(previous) = previous {
            sqlx::query("DELETE FROM session WHERE token = ?")
                .bind(previous)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query(
            r#"
            INSERT INTO session (token, user_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(format_timestamp(&now))
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from_insert(e, "Session token collision"))?;
        tx.commit().await?;

        Ok(Session {
            token: token.to_string(),
            user_id,
            created_at: now,
        })
    }

    /// Get a session by token
    pub async fn get_session(&self, token: &str) -> Result<Option<Session>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT token, user_id, created_at
            FROM session
            WHERE token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Session::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Delete a session
    pub async fn delete_session(&self, token: &str) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM session WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

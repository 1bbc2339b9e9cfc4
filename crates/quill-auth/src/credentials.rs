//! Credential store: registration and password verification

use quill_db::{Database, DbError, NewUser, User};
use tracing::{debug, info};

use crate::error::AuthError;
use crate::password::{hash_password, verify_password};

/// Username/password-hash pairs backed by the `user` table
#[derive(Clone)]
pub struct CredentialStore {
    db: Database,
}

impl CredentialStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Register a new user and return its ID
    ///
    /// The username is checked before the password, so a form with both
    /// fields empty reports the missing username.
    pub async fn register(&self, username: &str, password: &str) -> Result<i64, AuthError> {
        if username.is_empty() {
            return Err(AuthError::Validation("Username is required.".to_string()));
        }
        if password.is_empty() {
            return Err(AuthError::Validation("Password is required.".to_string()));
        }

        let password_hash = run_blocking({
            let password = password.to_string();
            move || hash_password(&password)
        })
        .await?;

        let user = self
            .db
            .insert_user(NewUser {
                username: username.to_string(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                DbError::Duplicate(_) => AuthError::DuplicateUsername(username.to_string()),
                other => AuthError::Database(other),
            })?;

        info!("Registered user: {} (id {})", user.username, user.id);
        Ok(user.id)
    }

    /// Check a username/password pair and return the user's ID
    pub async fn verify(&self, username: &str, password: &str) -> Result<i64, AuthError> {
        debug!("Login attempt for user: {}", username);

        let user = self
            .db
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        let valid = run_blocking({
            let password = password.to_string();
            let hash = user.password_hash.clone();
            move || verify_password(&password, &hash)
        })
        .await?;

        if !valid {
            return Err(AuthError::BadPassword);
        }

        Ok(user.id)
    }

    /// Look up a user by ID
    pub async fn find_by_id(&self, user_id: i64) -> Result<Option<User>, AuthError> {
        Ok(self.db.get_user_by_id(user_id).await?)
    }
}

/// Run an Argon2 computation off the async worker threads
async fn run_blocking<T, F>(f: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AuthError::PasswordHash(format!("Task join error: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> CredentialStore {
        CredentialStore::new(Database::in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_register_then_verify() {
        let store = store().await;

        let id = store.register("alice", "pw1").await.unwrap();
        assert_eq!(store.verify("alice", "pw1").await.unwrap(), id);

        let user = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert_ne!(user.password_hash, "pw1");
    }

    #[tokio::test]
    async fn test_register_requires_both_fields() {
        let store = store().await;

        let err = store.register("", "").await.unwrap_err();
        assert_eq!(err.to_string(), "Username is required.");

        let err = store.register("alice", "").await.unwrap_err();
        assert_eq!(err.to_string(), "Password is required.");
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let store = store().await;

        let id = store.register("alice", "pw1").await.unwrap();
        let err = store.register("alice", "other").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateUsername(ref name) if name == "alice"));
        assert_eq!(err.to_string(), "User alice is already registered.");

        // The original credentials still work
        assert_eq!(store.verify("alice", "pw1").await.unwrap(), id);
        assert!(matches!(
            store.verify("alice", "other").await,
            Err(AuthError::BadPassword)
        ));
    }

    #[tokio::test]
    async fn test_verify_distinguishes_unknown_user_from_bad_password() {
        let store = store().await;
        store.register("alice", "pw1").await.unwrap();

        assert!(matches!(
            store.verify("bob", "pw1").await,
            Err(AuthError::UnknownUser)
        ));
        assert!(matches!(
            store.verify("alice", "wrong").await,
            Err(AuthError::BadPassword)
        ));
        assert!(matches!(
            store.verify("alice", "").await,
            Err(AuthError::BadPassword)
        ));
    }
}

//! Post repository
//!
//! Reads are open to everyone. Every mutation of an existing post goes
//! through [`PostRepository::get_owned`], which pairs the lookup with the
//! ownership guard.

use quill_auth::{AuthUser, require_ownership};
use quill_db::{Database, NewPost, PostWithAuthor};
use tracing::{debug, info};

use crate::error::CoreError;

/// CRUD over posts, each owned by the user who wrote it
#[derive(Clone)]
pub struct PostRepository {
    db: Database,
}

impl PostRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// All posts with their authors, newest first
    pub async fn list(&self) -> Result<Vec<PostWithAuthor>, CoreError> {
        Ok(self.db.list_posts().await?)
    }

    /// Create a post authored by `author_id` and return its ID
    pub async fn create(&self, author_id: i64, title: &str, body: &str) -> Result<i64, CoreError> {
        validate_post(title, body)?;

        let post = self
            .db
            .insert_post(NewPost {
                author_id,
                title: title.to_string(),
                body: body.to_string(),
            })
            .await?;

        info!("Created post {} by user id {}", post.id, author_id);
        Ok(post.id)
    }

    /// Fetch a single post
    pub async fn get(&self, post_id: i64) -> Result<PostWithAuthor, CoreError> {
        self.db
            .get_post(post_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Post id {post_id} doesn't exist.")))
    }

    /// Fetch a post that `user` is allowed to modify
    pub async fn get_owned(&self, user: &AuthUser, post_id: i64) -> Result<PostWithAuthor, CoreError> {
        let post = self.get(post_id).await?;
        require_ownership(user, &post.post)?;
        Ok(post)
    }

    /// Replace the title and body of one of `user`'s posts
    pub async fn update(
        &self,
        user: &AuthUser,
        post_id: i64,
        title: &str,
        body: &str,
    ) -> Result<(), CoreError> {
        self.get_owned(user, post_id).await?;
        validate_post(title, body)?;

        debug!("Updating post {}", post_id);
        if !self.db.update_post(post_id, user.id, title, body).await? {
            return Err(CoreError::NotFound(format!("Post id {post_id} doesn't exist.")));
        }

        info!("Updated post {}", post_id);
        Ok(())
    }

    /// Delete one of `user`'s posts
    pub async fn delete(&self, user: &AuthUser, post_id: i64) -> Result<(), CoreError> {
        self.get_owned(user, post_id).await?;

        debug!("Deleting post {}", post_id);
        if !self.db.delete_post(post_id, user.id).await? {
            return Err(CoreError::NotFound(format!("Post id {post_id} doesn't exist.")));
        }

        info!("Deleted post {}", post_id);
        Ok(())
    }
}

/// Both fields are required. When both are missing the body message wins,
/// since it is checked last.
fn validate_post(title: &str, body: &str) -> Result<(), CoreError> {
    let mut error = None;
    if title.is_empty() {
        error = Some("Title is required.");
    }
    if body.is_empty() {
        error = Some("Content is required.");
    }

    match error {
        Some(message) => Err(CoreError::Validation(message.to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_auth::{AuthError, CredentialStore, SessionConfig, SessionManager};

    struct Fixture {
        credentials: CredentialStore,
        sessions: SessionManager,
        posts: PostRepository,
    }

    async fn fixture() -> Fixture {
        let db = Database::in_memory().await.unwrap();
        Fixture {
            credentials: CredentialStore::new(db.clone()),
            sessions: SessionManager::new(db.clone(), SessionConfig::default()),
            posts: PostRepository::new(db),
        }
    }

    async fn user(f: &Fixture, name: &str) -> AuthUser {
        let id = f.credentials.register(name, "pw").await.unwrap();
        AuthUser {
            id,
            username: name.to_string(),
        }
    }

    fn is_forbidden(result: Result<(), CoreError>) -> bool {
        matches!(result, Err(CoreError::Auth(AuthError::Forbidden)))
    }

    #[test]
    fn test_validate_post_messages() {
        assert!(validate_post("T", "B").is_ok());
        assert_eq!(validate_post("", "B").unwrap_err().to_string(), "Title is required.");
        assert_eq!(validate_post("T", "").unwrap_err().to_string(), "Content is required.");
        assert_eq!(validate_post("", "").unwrap_err().to_string(), "Content is required.");
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let f = fixture().await;
        let alice = user(&f, "alice").await;

        let id = f.posts.create(alice.id, "T", "B").await.unwrap();
        let fetched = f.posts.get(id).await.unwrap();

        assert_eq!(fetched.post.title, "T");
        assert_eq!(fetched.post.body, "B");
        assert_eq!(fetched.post.author_id, alice.id);
        assert_eq!(fetched.username, "alice");
    }

    #[tokio::test]
    async fn test_create_rejects_empty_fields() {
        let f = fixture().await;
        let alice = user(&f, "alice").await;

        assert!(matches!(
            f.posts.create(alice.id, "", "B").await,
            Err(CoreError::Validation(_))
        ));
        assert!(f.posts.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_missing_post() {
        let f = fixture().await;
        let err = f.posts.get(42).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
        assert_eq!(err.to_string(), "Post id 42 doesn't exist.");
    }

    #[tokio::test]
    async fn test_list_order_is_stable() {
        let f = fixture().await;
        let alice = user(&f, "alice").await;
        for title in ["A", "B", "C"] {
            f.posts.create(alice.id, title, "body").await.unwrap();
        }

        let titles: Vec<String> = f
            .posts
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.post.title)
            .collect();
        assert_eq!(titles, vec!["C", "B", "A"]);
    }

    #[tokio::test]
    async fn test_only_author_may_mutate() {
        let f = fixture().await;
        let alice = user(&f, "alice").await;
        let bob = user(&f, "bob").await;
        let id = f.posts.create(alice.id, "Hi", "World").await.unwrap();

        assert!(is_forbidden(f.posts.update(&bob, id, "X", "Y").await));
        assert!(is_forbidden(f.posts.delete(&bob, id).await));
        assert_eq!(f.posts.get(id).await.unwrap().post.title, "Hi");

        // Ownership is checked before the submitted fields are validated
        assert!(is_forbidden(f.posts.update(&bob, id, "", "").await));
        assert!(matches!(
            f.posts.update(&alice, id, "", "Y").await,
            Err(CoreError::Validation(_))
        ));

        let before = f.posts.get(id).await.unwrap().post;
        f.posts.update(&alice, id, "Hello", "There").await.unwrap();
        let after = f.posts.get(id).await.unwrap().post;
        assert_eq!(after.title, "Hello");
        assert_eq!(after.body, "There");
        assert_eq!(after.author_id, before.author_id);
        assert_eq!(after.created_at, before.created_at);

        f.posts.delete(&alice, id).await.unwrap();
        assert!(matches!(f.posts.get(id).await, Err(CoreError::NotFound(_))));
        assert!(matches!(
            f.posts.delete(&alice, id).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_two_user_scenario() {
        let f = fixture().await;

        f.credentials.register("alice", "pw1").await.unwrap();
        let alice_id = f.credentials.verify("alice", "pw1").await.unwrap();
        let token = f.sessions.login(None, alice_id).await.unwrap();
        let alice = f.sessions.current_user(Some(&token)).await.unwrap().unwrap();

        let post_id = f.posts.create(alice.id, "Hi", "World").await.unwrap();
        let listed = f.posts.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].post.title, "Hi");

        f.credentials.register("bob", "pw2").await.unwrap();
        let bob_id = f.credentials.verify("bob", "pw2").await.unwrap();
        let token = f.sessions.login(Some(&token), bob_id).await.unwrap();
        let bob = f.sessions.current_user(Some(&token)).await.unwrap().unwrap();
        assert!(is_forbidden(f.posts.update(&bob, post_id, "X", "Y").await));

        f.sessions.logout(&token).await.unwrap();
        assert!(f.sessions.current_user(Some(&token)).await.unwrap().is_none());

        let alice_id = f.credentials.verify("alice", "pw1").await.unwrap();
        let token = f.sessions.login(None, alice_id).await.unwrap();
        let alice = f.sessions.current_user(Some(&token)).await.unwrap().unwrap();
        f.posts.update(&alice, post_id, "Hi again", "World").await.unwrap();
        f.posts.delete(&alice, post_id).await.unwrap();
        assert!(f.posts.list().await.unwrap().is_empty());
    }
}

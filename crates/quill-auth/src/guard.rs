//! Request-scoped identity and the guards checked against it

use quill_db::{Post, User};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AuthError;

/// Authenticated user information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Identity resolved for one request
///
/// Built once by the session middleware before any handler runs and read
/// from the request extensions afterwards.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub current_user: Option<AuthUser>,
    /// Token presented by the client, whether or not it resolved
    pub session_token: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Require a logged-in user
pub fn require_authenticated(ctx: &RequestContext) -> Result<&AuthUser, AuthError> {
    ctx.current_user.as_ref().ok_or(AuthError::AuthenticationRequired)
}

/// Require that `user` wrote `post`
pub fn require_ownership(user: &AuthUser, post: &Post) -> Result<(), AuthError> {
    if post.author_id != user.id {
        warn!(
            "User {} denied access to post {} owned by user id {}",
            user.username, post.id, post.author_id
        );
        return Err(AuthError::Forbidden);
    }
    Ok(())
}

//! Server-side sessions keyed by an opaque cookie token

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use quill_db::Database;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AuthError;
use crate::guard::AuthUser;

/// Session cookie settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Only send the cookie over HTTPS
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "quill_session".to_string(),
            secure: false,
        }
    }
}

/// Maps browser tokens to user IDs across requests
///
/// A client is Anonymous until `login` hands it a token, and becomes
/// Anonymous again once `logout` deletes the row behind that token.
#[derive(Clone)]
pub struct SessionManager {
    db: Database,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(db: Database, config: SessionConfig) -> Self {
        Self { db, config }
    }

    /// Start a session for `user_id` and return its token
    ///
    /// Whatever session the client held before is discarded first, so a
    /// token never survives a change of identity.
    pub async fn login(&self, previous: Option<&str>, user_id: i64) -> Result<String, AuthError> {
        let token = Uuid::new_v4().simple().to_string();
        self.db.replace_session(previous, &token, user_id).await?;
        info!("Session started for user id {}", user_id);
        Ok(token)
    }

    /// End the session behind `token`
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        if self.db.delete_session(token).await? {
            info!("Session ended");
        }
        Ok(())
    }

    /// Resolve a token to the user it was issued for
    ///
    /// No token, an unknown token, and a token whose user row is gone all
    /// resolve to `None`.
    pub async fn current_user(&self, token: Option<&str>) -> Result<Option<AuthUser>, AuthError> {
        let Some(token) = token else {
            return Ok(None);
        };
        let Some(session) = self.db.get_session(token).await? else {
            debug!("Unknown session token, treating request as anonymous");
            return Ok(None);
        };

        let user = self.db.get_user_by_id(session.user_id).await?;
        if user.is_none() {
            debug!("Session refers to missing user id {}", session.user_id);
        }
        Ok(user.as_ref().map(AuthUser::from))
    }

    /// Read the session token from a request's cookies
    pub fn token_from_jar(&self, jar: &CookieJar) -> Option<String> {
        jar.get(&self.config.cookie_name)
            .map(|cookie| cookie.value().to_string())
            .filter(|token| !token.is_empty())
    }

    /// Browser-session cookie carrying `token`
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.config.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.secure)
            .build()
    }

    /// Cookie that clears the session token from the browser
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((self.config.cookie_name.clone(), "")).path("/").build()
    }
}

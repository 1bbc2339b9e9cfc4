//! Session middleware for Axum

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use crate::guard::RequestContext;
use crate::session::SessionManager;

/// Session middleware
///
/// Resolves the session cookie to a user once per request and stores the
/// result as a [`RequestContext`] in the request extensions. Lookup failures
/// are logged and the request proceeds as anonymous.
pub async fn session_middleware(
    State(sessions): State<SessionManager>,
    mut request: Request,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let session_token = sessions.token_from_jar(&jar);

    let current_user = match sessions.current_user(session_token.as_deref()).await {
        Ok(user) => user,
        Err(e) => {
            warn!("Session lookup failed, treating request as anonymous: {}", e);
            None
        }
    };

    if let Some(user) = &current_user {
        debug!("Authenticated user: {} ({})", user.username, user.id);
    }

    request.extensions_mut().insert(RequestContext {
        current_user,
        session_token,
    });

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use axum::{Extension, Router, body::Body, http::header::COOKIE, routing::get};
    use quill_db::{Database, NewUser};
    use tower::ServiceExt;

    async fn whoami(Extension(ctx): Extension<RequestContext>) -> String {
        ctx.current_user
            .map(|u| u.username)
            .unwrap_or_else(|| "anonymous".to_string())
    }

    async fn app() -> (Router, SessionManager, i64) {
        let db = Database::in_memory().await.unwrap();
        let user = db
            .insert_user(NewUser {
                username: "alice".to_string(),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap();
        let sessions = SessionManager::new(db, SessionConfig::default());
        let router = Router::new().route("/", get(whoami)).layer(
            axum::middleware::from_fn_with_state(sessions.clone(), session_middleware),
        );
        (router, sessions, user.id)
    }

    async fn body_of(router: Router, cookie: Option<String>) -> String {
        let mut request = axum::http::Request::builder().uri("/");
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }
        let response = router
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_resolves_session_cookie() {
        let (router, sessions, alice) = app().await;
        let token = sessions.login(None, alice).await.unwrap();

        let body = body_of(router, Some(format!("quill_session={token}"))).await;
        assert_eq!(body, "alice");
    }

    #[tokio::test]
    async fn test_missing_or_stale_cookie_is_anonymous() {
        let (router, sessions, alice) = app().await;
        assert_eq!(body_of(router.clone(), None).await, "anonymous");

        let token = sessions.login(None, alice).await.unwrap();
        sessions.logout(&token).await.unwrap();
        let body = body_of(router, Some(format!("quill_session={token}"))).await;
        assert_eq!(body, "anonymous");
    }
}

//! API error types

use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{Html, IntoResponse, Redirect, Response};
use quill_auth::{AuthError, RequestContext};
use quill_core::CoreError;
use thiserror::Error;
use tracing::error;

use crate::views;

/// Where unauthenticated visitors are sent
pub const LOGIN_PATH: &str = "/auth/login";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Forbidden")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] quill_db::DbError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationRequired => ApiError::AuthenticationRequired,
            AuthError::Forbidden => ApiError::Forbidden,
            AuthError::Database(e) => ApiError::Database(e),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(msg) => ApiError::NotFound(msg),
            // Handlers re-render their form on validation errors
            CoreError::Validation(msg) => ApiError::Internal(msg),
            CoreError::Auth(e) => e.into(),
            CoreError::Database(e) => ApiError::Database(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::AuthenticationRequired => return Redirect::to(LOGIN_PATH).into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "You don't have the permission to access the requested resource.".to_string(),
            ),
            ApiError::Internal(_) | ApiError::Database(_) => {
                error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The server encountered an internal error.".to_string(),
                )
            }
        };

        let mut response = (status, views::error_page(status, None, &message)).into_response();
        response.extensions_mut().insert(ErrorMessage(message));
        response
    }
}

/// Message behind a rendered error page
#[derive(Clone)]
struct ErrorMessage(String);

/// Re-render error pages with the caller's identity in the nav
///
/// `IntoResponse` has no access to the request, so `ApiError` renders its
/// page for an anonymous visitor. This layer runs inside the session
/// middleware and swaps in the signed-in user's nav.
pub async fn error_page_identity(request: Request, next: Next) -> Response {
    let user = request
        .extensions()
        .get::<RequestContext>()
        .and_then(|ctx| ctx.current_user.clone());

    let mut response = next.run(request).await;
    let Some(user) = user else {
        return response;
    };

    if let Some(ErrorMessage(message)) = response.extensions_mut().remove::<ErrorMessage>() {
        let Html(page) = views::error_page(response.status(), Some(&user), &message);
        *response.body_mut() = Body::from(page);
    }
    response
}

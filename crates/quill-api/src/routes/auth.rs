//! Identity extractors and the register/login/logout routes

use std::convert::Infallible;

use axum::{
    Form, Router,
    extract::{FromRequestParts, State},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use quill_auth::{AuthUser, RequestContext, require_authenticated};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{ApiError, LOGIN_PATH};
use crate::state::AppState;
use crate::views;

// ==================== Identity Extractors ====================

/// Identity of the caller, possibly anonymous
pub struct Identity(pub RequestContext);

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Identity(request_context(parts)))
    }
}

/// Context stored by the session middleware; anonymous if it never ran
fn request_context(parts: &Parts) -> RequestContext {
    parts
        .extensions
        .get::<RequestContext>()
        .cloned()
        .unwrap_or_else(RequestContext::anonymous)
}

/// Extractor for an authenticated user (required)
///
/// Anonymous callers are redirected to the login page before the handler
/// runs.
pub struct RequireAuth(pub AuthUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = request_context(parts);
        let user = require_authenticated(&ctx)?;
        Ok(RequireAuth(user.clone()))
    }
}

// ==================== Forms ====================

/// Register and login form
///
/// Missing fields deserialize as empty so they produce the same messages
/// as fields submitted blank.
#[derive(Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// ==================== Auth Routes ====================

/// GET /auth/register
async fn register_form() -> Response {
    views::register_page(None).into_response()
}

/// POST /auth/register
async fn register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, ApiError> {
    match state.credentials.register(&form.username, &form.password).await {
        Ok(_) => {
            metrics::counter!("quill_registrations_total").increment(1);
            Ok(Redirect::to(LOGIN_PATH).into_response())
        }
        Err(e) if e.is_user_correctable() => {
            debug!("Registration rejected: {}", e);
            Ok(views::register_page(Some(&e.to_string())).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /auth/login
async fn login_form() -> Response {
    views::login_page(None).into_response()
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    jar: CookieJar,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, ApiError> {
    let user_id = match state.credentials.verify(&form.username, &form.password).await {
        Ok(id) => id,
        Err(e) if e.is_user_correctable() => {
            metrics::counter!("quill_logins_total", "result" => "failure").increment(1);
            debug!("Login rejected for {}: {}", form.username, e);
            return Ok(views::login_page(Some(&e.to_string())).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let token = state
        .sessions
        .login(ctx.session_token.as_deref(), user_id)
        .await?;

    metrics::counter!("quill_logins_total", "result" => "success").increment(1);
    info!("User {} logged in", form.username);

    let jar = jar.add(state.sessions.session_cookie(token));
    Ok((jar, Redirect::to("/")).into_response())
}

/// GET /auth/logout
async fn logout(
    State(state): State<AppState>,
    Identity(ctx): Identity,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    if let Some(token) = ctx.session_token.as_deref() {
        state.sessions.logout(token).await?;
    }
    if let Some(user) = &ctx.current_user {
        info!("User {} logged out", user.username);
    }

    let jar = jar.remove(state.sessions.removal_cookie());
    Ok((jar, Redirect::to("/")).into_response())
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", get(register_form).post(register))
        .route("/auth/login", get(login_form).post(login))
        .route("/auth/logout", get(logout))
}

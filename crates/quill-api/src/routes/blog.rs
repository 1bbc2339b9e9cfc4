//! Post routes: the public list and the guarded create/update/delete forms

use axum::{
    Form, Router,
    extract::{FromRequestParts, Path, State},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use quill_core::CoreError;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;
use crate::views;

use super::auth::{Identity, RequireAuth};

/// Post id taken from the path
///
/// Anything that is not an `i64` names no post, so it is rejected as
/// not found rather than as a malformed request.
pub struct PostId(pub i64);

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound("Post doesn't exist.".to_string()))?;

        raw.parse()
            .map(PostId)
            .map_err(|_| ApiError::NotFound(format!("Post id {raw} doesn't exist.")))
    }
}

/// Create and update form
#[derive(Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

/// GET /
async fn index(
    State(state): State<AppState>,
    Identity(ctx): Identity,
) -> Result<Response, ApiError> {
    let posts = state.posts.list().await?;
    Ok(views::index_page(ctx.current_user.as_ref(), &posts).into_response())
}

/// GET /create
async fn create_form(RequireAuth(user): RequireAuth) -> Response {
    views::create_page(&user, None, "", "").into_response()
}

/// POST /create
async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<PostForm>,
) -> Result<Response, ApiError> {
    match state.posts.create(user.id, &form.title, &form.body).await {
        Ok(_) => {
            metrics::counter!("quill_posts_created_total").increment(1);
            Ok(Redirect::to("/").into_response())
        }
        Err(CoreError::Validation(message)) => {
            debug!("Post rejected: {}", message);
            Ok(views::create_page(&user, Some(&message), &form.title, &form.body).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /{id}/update
async fn update_form(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PostId(id): PostId,
) -> Result<Response, ApiError> {
    let entry = state.posts.get_owned(&user, id).await?;
    let post = entry.post;
    Ok(views::update_page(&user, post.id, None, &post.title, &post.body).into_response())
}

/// POST /{id}/update
async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PostId(id): PostId,
    Form(form): Form<PostForm>,
) -> Result<Response, ApiError> {
    match state.posts.update(&user, id, &form.title, &form.body).await {
        Ok(()) => Ok(Redirect::to("/").into_response()),
        Err(CoreError::Validation(message)) => {
            debug!("Update of post {} rejected: {}", id, message);
            Ok(views::update_page(&user, id, Some(&message), &form.title, &form.body).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /{id}/delete
async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    PostId(id): PostId,
) -> Result<Response, ApiError> {
    state.posts.delete(&user, id).await?;
    Ok(Redirect::to("/").into_response())
}

/// Create post routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/create", get(create_form).post(create))
        .route("/{id}/update", get(update_form).post(update))
        .route("/{id}/delete", post(delete))
}

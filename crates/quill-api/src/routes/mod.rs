//! HTTP routes

mod auth;
mod blog;
mod health;
pub mod metrics;

use axum::{Router, middleware};
use quill_auth::session_middleware;

use crate::error::error_page_identity;
use crate::state::{AppState, MetricsHandle};

pub use auth::{Identity, RequireAuth};

/// Create the main router
///
/// The session middleware wraps every route, so handlers and extractors can
/// rely on a `RequestContext` being present in the request extensions.
/// Error pages are re-rendered inside it so their nav shows who is signed in.
pub fn create_router(state: AppState, metrics_handle: Option<MetricsHandle>) -> Router {
    let sessions = state.sessions.clone();

    let mut router = Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(blog::routes())
        .layer(middleware::from_fn(error_page_identity))
        .layer(middleware::from_fn_with_state(sessions, session_middleware))
        .with_state(state);

    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
}

//! Quill HTTP API
//!
//! This crate provides the Axum router for Quill: the register/login/logout
//! pages, the post list and the guarded create/update/delete forms, plus
//! health and metrics endpoints.

pub mod error;
pub mod routes;
pub mod state;
pub mod views;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};

//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] quill_db::DbError),

    #[error("{0}")]
    Auth(#[from] quill_auth::AuthError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),
}

//! Authentication error types

use quill_db::DbError;
use thiserror::Error;

/// Failures raised while establishing or checking an identity
///
/// The display strings of the user-correctable variants are the messages
/// shown on the register and login forms.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("User {0} is already registered.")]
    DuplicateUsername(String),

    #[error("Incorrect username.")]
    UnknownUser,

    #[error("Incorrect password.")]
    BadPassword,

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Forbidden")]
    Forbidden,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl AuthError {
    /// Whether the user can fix this by resubmitting the form
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            AuthError::Validation(_)
                | AuthError::DuplicateUsername(_)
                | AuthError::UnknownUser
                | AuthError::BadPassword
        )
    }
}

//! Quill Authentication and Authorization
//!
//! This crate provides password hashing, the credential store, cookie-backed
//! server-side sessions, and the guards that decide whether the identity
//! attached to a request may perform an operation.

pub mod credentials;
pub mod error;
pub mod guard;
pub mod middleware;
pub mod password;
pub mod session;

pub use credentials::CredentialStore;
pub use error::AuthError;
pub use guard::{require_authenticated, require_ownership, AuthUser, RequestContext};
pub use middleware::session_middleware;
pub use password::{hash_password, verify_password};
pub use session::{SessionConfig, SessionManager};
